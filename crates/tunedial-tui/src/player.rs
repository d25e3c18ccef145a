//! Single-slot external player process.
//!
//! At most one player child is alive at a time: `play` always
//! terminates and reaps the previous child before spawning the next,
//! so a new stream strictly follows the old process's termination.

use std::process::{Child, Command, Stdio};

use anyhow::Context;
use tracing::{debug, info};

pub struct Player {
    command: String,
    child: Option<Child>,
}

impl Player {
    pub fn new(command: String) -> Self {
        Self {
            command,
            child: None,
        }
    }

    /// Stop whatever is playing, then hand `args` to the player binary.
    pub fn play(&mut self, args: &[String]) -> anyhow::Result<()> {
        self.stop();
        info!("spawning player: {} {:?}", self.command, args);
        let child = Command::new(&self.command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("could not launch player `{}`", self.command))?;
        self.child = Some(child);
        Ok(())
    }

    /// Terminate and wait on the current child, if any.
    pub fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            debug!("stopping player pid={}", child.id());
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    /// Reap an exited child. Returns true while a child is running.
    pub fn poll(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => match child.try_wait() {
                Ok(Some(status)) => {
                    debug!("player exited: {status}");
                    self.child = None;
                    false
                }
                Ok(None) => true,
                Err(_) => {
                    self.child = None;
                    false
                }
            },
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.child.is_some()
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_replaces_the_previous_child() {
        let mut player = Player::new("sleep".to_string());
        player.play(&["30".to_string()]).unwrap();
        assert!(player.poll());
        // Starting a second stream reaps the first child before the
        // new one spawns; only one slot exists.
        player.play(&["30".to_string()]).unwrap();
        assert!(player.is_active());
        player.stop();
        assert!(!player.poll());
        assert!(!player.is_active());
    }

    #[test]
    fn poll_reaps_a_finished_child() {
        let mut player = Player::new("true".to_string());
        player.play(&[]).unwrap();
        // The child exits on its own; poll eventually reports it gone.
        for _ in 0..100 {
            if !player.poll() {
                return;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        panic!("child never reaped");
    }

    #[test]
    fn missing_binary_is_an_error_not_a_panic() {
        let mut player = Player::new("definitely-not-a-player".to_string());
        assert!(player.play(&["x".to_string()]).is_err());
        assert!(!player.is_active());
    }
}
