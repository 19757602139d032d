//! Client side of the engine protocol
//!
//! Every delegated operation spawns one engine process, writes the request
//! and a single command, and reads exactly one response.

use crate::protocol::{self, Command};
use pixdiff_core::{
    BoundingBox, ColorHistogram, Error, PixelEngine, PixelFrame, Result, RgbaColor,
};
use std::fmt;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command as Process, Stdio};

/// Environment variable naming the engine executable
pub const ENGINE_ENV: &str = "PIXDIFF_ENGINE";

/// Engine executable used when nothing else is configured
pub const DEFAULT_ENGINE: &str = "./bitmaptools";

/// Which engine executable to run, and with which arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ENGINE)
    }
}

impl EngineConfig {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Read the program from `PIXDIFF_ENGINE`, falling back to
    /// `./bitmaptools`.
    pub fn from_env() -> Self {
        match std::env::var_os(ENGINE_ENV) {
            Some(program) if !program.is_empty() => Self::new(program),
            _ => Self::default(),
        }
    }

    /// Append an argument passed to the engine on every spawn.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// A single-use connection to an engine process.
///
/// [`EngineChannel::open`] starts the engine and sends the request;
/// [`EngineChannel::run_command`] sends one command, closes the engine's
/// input and reads the response. A second command fails with
/// [`Error::ChannelReused`].
pub struct EngineChannel {
    program: PathBuf,
    child: Child,
    stdin: Option<ChildStdin>,
}

impl fmt::Debug for EngineChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineChannel")
            .field("program", &self.program)
            .field("pid", &self.child.id())
            .field("used", &self.stdin.is_none())
            .finish()
    }
}

impl EngineChannel {
    /// Spawn the engine and write the request for `frame`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EngineFailed`] if the engine cannot be started or
    /// stops reading before the request is written. The detail is the
    /// engine's error output when it wrote any.
    pub fn open(config: &EngineConfig, frame: &PixelFrame<'_>) -> Result<Self> {
        let mut child = Process::new(&config.program)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::EngineFailed {
                detail: format!("failed to start {}: {}", config.program.display(), e),
            })?;
        let stdin = child.stdin.take();

        let mut channel = Self {
            program: config.program.clone(),
            child,
            stdin,
        };
        let written = match channel.stdin.as_mut() {
            Some(stdin) => protocol::write_request(stdin, frame),
            None => Err(Error::Protocol("engine input is not piped".to_string())),
        };
        if let Err(e) = written {
            return Err(channel.failure(e));
        }
        Ok(channel)
    }

    /// Send `command`, close the engine's input and read its response.
    ///
    /// # Errors
    ///
    /// - [`Error::ChannelReused`] if a command was already sent
    /// - [`Error::EngineFailed`] if the engine produced no response
    /// - [`Error::Protocol`] for a malformed response
    pub fn run_command(&mut self, command: &Command) -> Result<Vec<u8>> {
        let Some(mut stdin) = self.stdin.take() else {
            return Err(Error::ChannelReused);
        };
        log::debug!(
            "engine {} command {:?}",
            self.program.display(),
            command
        );

        let written = command
            .write_to(&mut stdin)
            .and_then(|()| stdin.flush().map_err(Error::from));
        drop(stdin);
        if let Err(e) = written {
            return Err(self.failure(e));
        }

        let response = match self.child.stdout.as_mut() {
            Some(stdout) => protocol::read_response(stdout)?,
            None => return Err(Error::Protocol("engine output is not piped".to_string())),
        };
        match response {
            Some(payload) => {
                self.finish()?;
                Ok(payload)
            }
            None => Err(self.failure("engine exited without a response")),
        }
    }

    fn finish(&mut self) -> Result<()> {
        let status = self.child.wait()?;
        if !status.success() {
            let mut stderr = String::new();
            if let Some(mut pipe) = self.child.stderr.take() {
                pipe.read_to_string(&mut stderr)?;
            }
            log::warn!(
                "engine {} exited with {} after answering: {}",
                self.program.display(),
                status,
                stderr.trim()
            );
        }
        Ok(())
    }

    /// Collect the engine's error output as the failure detail.
    fn failure(&mut self, cause: impl fmt::Display) -> Error {
        self.stdin = None;
        let mut stderr = String::new();
        if let Some(mut pipe) = self.child.stderr.take() {
            // Best effort: the cause below stands in if this fails
            let _ = pipe.read_to_string(&mut stderr);
        }
        let _ = self.child.wait();

        let stderr = stderr.trim();
        let detail = if stderr.is_empty() {
            cause.to_string()
        } else {
            stderr.to_string()
        };
        Error::EngineFailed { detail }
    }
}

impl Drop for EngineChannel {
    fn drop(&mut self) {
        self.stdin = None;
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// [`PixelEngine`] that runs every operation in a fresh engine process.
#[derive(Debug, Clone, Default)]
pub struct ProcessEngine {
    config: EngineConfig,
}

impl ProcessEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Engine configured from `PIXDIFF_ENGINE`.
    pub fn from_env() -> Self {
        Self::new(EngineConfig::from_env())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn call(&self, frame: &PixelFrame<'_>, command: Command) -> Result<Vec<u8>> {
        EngineChannel::open(&self.config, frame)?.run_command(&command)
    }
}

impl PixelEngine for ProcessEngine {
    fn crop_pixels(&self, frame: &PixelFrame<'_>) -> Result<Vec<u8>> {
        self.call(frame, Command::CropPixels)
    }

    fn histogram(
        &self,
        frame: &PixelFrame<'_>,
        ignore_color: Option<RgbaColor>,
        tolerance: u8,
    ) -> Result<ColorHistogram> {
        let payload = self.call(
            frame,
            Command::Histogram {
                ignore_color,
                tolerance,
            },
        )?;
        protocol::decode_histogram(&payload, ignore_color)
    }

    fn bounding_box(
        &self,
        frame: &PixelFrame<'_>,
        color: RgbaColor,
        tolerance: u8,
    ) -> Result<BoundingBox> {
        let payload = self.call(frame, Command::BoundingBox { color, tolerance })?;
        protocol::decode_bounding_box(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = EngineConfig::default();
        assert_eq!(config.program, PathBuf::from("./bitmaptools"));
        assert!(config.args.is_empty());
    }

    #[test]
    fn test_config_args() {
        let config = EngineConfig::new("/usr/bin/engine").arg("--fast").arg("-v");
        assert_eq!(config.args, vec!["--fast".to_string(), "-v".to_string()]);
    }

    #[test]
    fn test_missing_program() {
        let engine = ProcessEngine::new(EngineConfig::new("/nonexistent/pixdiff-engine"));
        let pixels = vec![0u8; 3];
        let frame = PixelFrame::new(
            pixdiff_core::Bpp::Rgb,
            1,
            1,
            pixdiff_core::Rect::full(1, 1),
            &pixels,
        )
        .unwrap();
        match engine.crop_pixels(&frame) {
            Err(Error::EngineFailed { detail }) => {
                assert!(detail.contains("/nonexistent/pixdiff-engine"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
