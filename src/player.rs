//! Playback surfaces.
//!
//! A surface is anything that can take a stream URL and play it. The session
//! only hands URLs over; whether the stream service actually has the item,
//! and how playback failures are shown, is up to the surface.

use std::process::Stdio;

use tokio::process::{Child, Command};
use url::Url;

use crate::{
    config::PlayerConfig,
    error::{Error, Result},
};

/// Flags passed along with every URL.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct PlaybackOptions {
    /// Show the surface's native controls.
    pub controls: bool,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self { controls: true }
    }
}

pub trait Surface {
    /// Starts playing `url`, replacing whatever was playing before.
    ///
    /// # Errors
    ///
    /// Returns an error if playback could not be handed off at all.
    fn play(&mut self, url: &Url, options: PlaybackOptions) -> Result<()>;

    /// Stops playback, if any.
    fn stop(&mut self);
}

/// Plays streams by launching an external video player.
#[derive(Debug)]
pub struct ExternalPlayer {
    program: String,
    args: Vec<String>,
    no_controls_arg: String,
    child: Option<Child>,
}

impl ExternalPlayer {
    /// # Errors
    ///
    /// Returns `InvalidArgument` if no program is configured.
    pub fn new(config: &PlayerConfig) -> Result<Self> {
        if config.program.trim().is_empty() {
            return Err(Error::invalid_argument("no player program configured"));
        }

        Ok(Self {
            program: config.program.clone(),
            args: config.args.clone(),
            no_controls_arg: config.no_controls_arg.clone(),
            child: None,
        })
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Builds the command line for `url` without running it.
    #[must_use]
    pub fn command_line(&self, url: &Url, options: PlaybackOptions) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 3);
        argv.push(self.program.clone());
        argv.extend(self.args.iter().cloned());
        if !options.controls && !self.no_controls_arg.is_empty() {
            argv.push(self.no_controls_arg.clone());
        }
        argv.push(url.to_string());
        argv
    }

    /// Whether a previously launched player is still running.
    pub fn is_running(&mut self) -> bool {
        self.child
            .as_mut()
            .is_some_and(|child| matches!(child.try_wait(), Ok(None)))
    }
}

impl Surface for ExternalPlayer {
    fn play(&mut self, url: &Url, options: PlaybackOptions) -> Result<()> {
        self.stop();

        let argv = self.command_line(url, options);
        debug!("launching {argv:?}");

        let child = Command::new(&argv[0])
            .args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                let e = Error::from(e);
                Error::new(e.kind, format!("cannot launch {}: {}", self.program, e.error))
            })?;

        if let Some(pid) = child.id() {
            trace!("player pid: {pid}");
        }
        self.child = Some(child);

        Ok(())
    }

    fn stop(&mut self) {
        if self.is_running() {
            debug!("stopping {}", self.program);
        }
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.start_kill() {
                // Already exited on its own.
                trace!("stopping player: {e}");
            }
        }
    }
}

impl Drop for ExternalPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn url() -> Url {
        Url::parse("http://localhost:8080/api/stream?name=Die+Hard+2").unwrap()
    }

    #[test]
    fn command_line_ends_with_url() {
        let config = PlayerConfig {
            args: vec!["--fs".to_owned()],
            ..PlayerConfig::default()
        };
        let player = ExternalPlayer::new(&config).unwrap();

        assert_eq!(
            player.command_line(&url(), PlaybackOptions::default()),
            ["mpv", "--fs", "http://localhost:8080/api/stream?name=Die+Hard+2"]
        );
    }

    #[test]
    fn hides_controls_when_asked() {
        let player = ExternalPlayer::new(&PlayerConfig::default()).unwrap();
        let argv = player.command_line(&url(), PlaybackOptions { controls: false });
        assert_eq!(argv[1], "--no-osc");
        assert_eq!(argv.len(), 3);
    }

    #[test]
    fn rejects_empty_program() {
        let config = PlayerConfig {
            program: " ".to_owned(),
            ..PlayerConfig::default()
        };
        let err = ExternalPlayer::new(&config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn missing_program_fails_to_launch() {
        let config = PlayerConfig {
            program: "/nonexistent/reelplay-test-player".to_owned(),
            ..PlayerConfig::default()
        };
        let mut player = ExternalPlayer::new(&config).unwrap();

        let err = player.play(&url(), PlaybackOptions::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert!(err
            .to_string()
            .contains("cannot launch /nonexistent/reelplay-test-player: "));
        assert!(!player.is_running());

        player.stop();
        assert!(!player.is_running());
    }
}
