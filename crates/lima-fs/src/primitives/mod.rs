mod copy;
mod staged;
mod sweep;

pub use copy::install_copy;
pub use staged::{Placement, StagedFile};
pub use sweep::sweep_stale;

/// `EXDEV`: rename across mount points.
fn is_cross_device(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::CrossesDevices
        || (cfg!(unix) && err.raw_os_error() == Some(18))
}
