// src/exec/terminate.rs

//! Forced termination that only returns once the child has been reaped.

use std::io;
use std::process::ExitStatus;

use tokio::process::Child;
use tracing::{debug, warn};

/// Kill `child` and wait for its exit status.
///
/// On unix the whole process group is sent SIGKILL first (the child was
/// spawned as a group leader), then the child itself is killed directly in
/// case the group signal did not land. Either way this awaits `wait()`, so
/// when it returns the OS has collected the exit status and no zombie is left.
pub async fn terminate_and_reap(child: &mut Child) -> io::Result<ExitStatus> {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            signal_process_group(pid);
        }
    }

    if let Err(e) = child.start_kill() {
        // Already exited (but not yet reaped) is the common reason.
        debug!(error = %e, "start_kill after group signal failed");
    }

    let status = child.wait().await?;
    debug!(?status, "terminated child reaped");
    Ok(status)
}

#[cfg(unix)]
fn signal_process_group(pid: u32) {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        warn!(pid, "pid does not fit in pid_t; skipping group signal");
        return;
    };

    match killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) => debug!(pid, "sent SIGKILL to process group"),
        Err(Errno::ESRCH) => debug!(pid, "process group already gone"),
        Err(e) => warn!(pid, error = %e, "failed to signal process group"),
    }
}
