use std::io;

/// Deliver `signo` to `pid`. Failures are logged and reported as `false`; nothing is retried.
pub fn send_signal(pid: u32, signo: i32) -> bool {
    let Ok(raw_pid) = libc::pid_t::try_from(pid) else {
        tracing::warn!(pid, signo, "pid out of range; signal not sent");
        return false;
    };
    // SAFETY: kill(2) only reads its integer arguments.
    let rc = unsafe { libc::kill(raw_pid, signo) };
    if rc != 0 {
        tracing::warn!(
            pid,
            signo,
            "failed to send signal: {}",
            io::Error::last_os_error()
        );
        return false;
    }
    true
}

/// Inclusive range of real-time signal numbers, when the platform has them.
#[cfg(target_os = "linux")]
pub fn realtime_range() -> Option<(i32, i32)> {
    Some((libc::SIGRTMIN(), libc::SIGRTMAX()))
}

#[cfg(not(target_os = "linux"))]
pub fn realtime_range() -> Option<(i32, i32)> {
    None
}
