use nix::errno::Errno;

use crate::platform::Request;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The kernel rejected a TUN control request.
    #[error("ioctl(fd, {request}, {arg}): {source}")]
    Ioctl {
        request: Request,
        /// Human readable rendering of the argument that was passed.
        arg: String,
        source: Errno,
    },
}

impl Error {
    /// The control request that failed.
    pub fn request(&self) -> Request {
        match self {
            Error::Ioctl { request, .. } => *request,
        }
    }

    /// The error code reported by the kernel.
    pub fn errno(&self) -> Errno {
        match self {
            Error::Ioctl { source, .. } => *source,
        }
    }
}

impl From<Error> for std::io::Error {
    fn from(value: Error) -> Self {
        let kind = std::io::Error::from(value.errno()).kind();
        std::io::Error::new(kind, value)
    }
}

pub type Result<T, E = Error> = ::std::result::Result<T, E>;
