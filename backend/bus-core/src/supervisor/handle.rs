use crate::supervisor::process::with_process;

use std::time::Duration;

use log::{debug, trace};
use tokio::process::Child as TokioChild;
use tokio::time::sleep as TokioSleep;

/// A spawned worker.
///
/// Holds the tokio child when this process owns it directly. Processes created in
/// another session are tracked by pid only and polled through sysinfo.
#[derive(Debug)]
pub struct ProcessHandle {
    pid: u32,
    image_name: String,
    child: Option<TokioChild>,
}

impl ProcessHandle {
    pub(crate) fn from_child(child: TokioChild, image_name: String) -> Self {
        Self {
            pid: child.id().unwrap_or_default(),
            image_name,
            child: Some(child),
        }
    }

    pub(crate) fn from_pid(pid: u32, image_name: String) -> Self {
        Self {
            pid,
            image_name,
            child: None,
        }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn image_name(&self) -> &str {
        &self.image_name
    }

    pub fn is_alive(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => with_process(self.pid, |_| true).unwrap_or(false),
        }
    }

    /// Resolve once the process has exited. Unowned processes are polled every `poll`.
    pub async fn wait_for_exit(&mut self, poll: Duration) {
        if let Some(child) = self.child.as_mut() {
            match child.wait().await {
                Ok(status) => debug!("Process {} exited with {status}", self.pid),
                Err(e) => debug!("Waiting on process {} failed: {e}", self.pid),
            }
            return;
        }

        while self.is_alive() {
            trace!("Process {} still alive, polling again in {poll:?}", self.pid);
            TokioSleep(poll).await;
        }
        debug!("Process {} exited", self.pid);
    }
}
