//! Device plumbing for pixelbot: profiles describing emulators or
//! ADB-connected devices, resolution of a logical handle to a controllable
//! surface, and the ADB process transport.

#![deny(clippy::all)]

pub mod adb;
pub mod error;
pub mod profile;
pub mod resolver;

pub use adb::AdbEndpoint;
pub use adb::AdbTransport;
pub use error::AdbError;
pub use error::HandleError;
pub use profile::AdbSpec;
pub use profile::DeviceProfile;
pub use profile::HandleSpec;
pub use resolver::HandleKind;
pub use resolver::HandleResolver;
pub use resolver::NativeHandle;
pub use resolver::ResolvedSurface;
pub use resolver::SurfaceTarget;
pub use resolver::WindowEnumerator;
