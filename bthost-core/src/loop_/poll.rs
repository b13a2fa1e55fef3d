//! Readiness polling for the fds the service loop owns directly — audio
//! transport pipes and the PAN tap device. Built on `libc::poll` rather
//! than an async reactor to match the loop's single-threaded, tick-driven
//! model.

use std::os::unix::io::RawFd;
use std::time::Duration;

use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct Interest: i16 {
        const READABLE = libc::POLLIN;
        const WRITABLE = libc::POLLOUT;
    }
}

/// Which fds fired and for what, produced by one `Poller::wait` call.
pub struct Readiness<T> {
    pub tag: T,
    pub readable: bool,
    pub writable: bool,
    pub hangup: bool,
}

struct Watched<T> {
    fd: RawFd,
    interest: Interest,
    tag: T,
}

/// A flat set of watched fds, polled together once per service-loop tick.
pub struct Poller<T> {
    watched: Vec<Watched<T>>,
}

impl<T> Default for Poller<T> {
    fn default() -> Self {
        Self { watched: Vec::new() }
    }
}

impl<T: Clone> Poller<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn watch(&mut self, fd: RawFd, interest: Interest, tag: T) {
        self.unwatch(fd);
        self.watched.push(Watched { fd, interest, tag });
    }

    pub fn unwatch(&mut self, fd: RawFd) {
        self.watched.retain(|w| w.fd != fd);
    }

    pub fn is_empty(&self) -> bool {
        self.watched.is_empty()
    }

    /// Block for up to `timeout` waiting for any watched fd to become
    /// ready. `None` means block indefinitely; the service loop instead
    /// always passes the timer set's next deadline so timers stay live.
    pub fn wait(&self, timeout: Option<Duration>) -> std::io::Result<Vec<Readiness<T>>> {
        if self.watched.is_empty() {
            if let Some(d) = timeout {
                std::thread::sleep(d);
            }
            return Ok(Vec::new());
        }

        let mut pollfds: Vec<libc::pollfd> = self
            .watched
            .iter()
            .map(|w| libc::pollfd { fd: w.fd, events: w.interest.bits(), revents: 0 })
            .collect();

        let timeout_ms = timeout.map(|d| d.as_millis().min(i32::MAX as u128) as i32).unwrap_or(-1);

        let rc = unsafe { libc::poll(pollfds.as_mut_ptr(), pollfds.len() as libc::nfds_t, timeout_ms) };
        if rc < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                return Ok(Vec::new());
            }
            return Err(err);
        }

        let mut ready = Vec::new();
        for (w, pfd) in self.watched.iter().zip(pollfds.iter()) {
            if pfd.revents == 0 {
                continue;
            }
            ready.push(Readiness {
                tag: w.tag.clone(),
                readable: pfd.revents & libc::POLLIN != 0,
                writable: pfd.revents & libc::POLLOUT != 0,
                hangup: pfd.revents & (libc::POLLHUP | libc::POLLERR) != 0,
            });
        }
        Ok(ready)
    }
}
