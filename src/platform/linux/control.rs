use std::fmt;
use std::os::fd::{AsRawFd, BorrowedFd};

use libc::c_int;
use nix::errno::Errno;
use nix::sys::ioctl::ioctl_param_type;

use crate::error::{Error, Result};
use crate::platform::linux::sys::{IfReq, Request};

/// Argument of a TUN control request.
pub enum Arg<'a> {
    /// Passed in the argument slot itself.
    Value(ioctl_param_type),
    /// The kernel reads an `int` through the pointer.
    IntRef(&'a c_int),
    /// The kernel reads the request and writes the resolved name back.
    IfReq(&'a mut IfReq),
}

impl fmt::Display for Arg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Value(v) => write!(f, "{v}"),
            Arg::IntRef(v) => write!(f, "{v}"),
            Arg::IfReq(req) => f.write_str(&req.name()),
        }
    }
}

/// Something TUN control requests can be issued against.
///
/// [`BorrowedFd`] is the real thing; everything above this trait is free of
/// direct system calls.
pub trait TunControl {
    fn ioctl(&mut self, request: Request, arg: &mut Arg<'_>) -> Result<(), Errno>;
}

impl TunControl for BorrowedFd<'_> {
    fn ioctl(&mut self, request: Request, arg: &mut Arg<'_>) -> Result<(), Errno> {
        let fd = self.as_raw_fd();
        let code = request.code();
        let res = unsafe {
            match *arg {
                Arg::Value(v) => libc::ioctl(fd, code, v),
                Arg::IntRef(v) => libc::ioctl(fd, code, v as *const c_int),
                Arg::IfReq(ref mut req) => libc::ioctl(fd, code, req.as_mut_ptr()),
            }
        };
        Errno::result(res).map(drop)
    }
}

/// Issue `request` and attach the request and argument to any failure.
pub(crate) fn control<C: TunControl + ?Sized>(
    ctl: &mut C,
    request: Request,
    mut arg: Arg<'_>,
) -> Result<()> {
    log::debug!("ioctl(fd, {request}, {arg})");
    ctl.ioctl(request, &mut arg).map_err(|source| Error::Ioctl {
        request,
        arg: arg.to_string(),
        source,
    })
}
