//! Reference implementations of the engine's collaborator traits: ADB
//! capture and input, pixel-scan recognition, and file screenshot storage.

pub mod adb;
pub mod pixels;
pub mod screenshot;

pub use adb::AdbCapture;
pub use adb::AdbInput;
pub use pixels::PixelComparer;
pub use pixels::PixelMatcher;
pub use pixels::TemplateStore;
pub use screenshot::FileSink;
