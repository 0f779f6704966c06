//! Resolution of a logical handle (window/view/control) against a device
//! profile into a concrete controllable surface.
//!
//! Offset correction happens once here; every coordinate downstream of a
//! [`ResolvedSurface`] is in corrected game-surface space and is translated
//! back to device space only at click time via [`ResolvedSurface::to_device`].

use pixelbot_core::{Point, Rect};
use tracing::debug;

use crate::adb::AdbEndpoint;
use crate::error::HandleError;
use crate::profile::{DeviceProfile, HandleSpec};

/// The closed set of logical handle targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Window,
    View,
    Control,
}

impl HandleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandleKind::Window => "window",
            HandleKind::View => "view",
            HandleKind::Control => "control",
        }
    }
}

impl std::fmt::Display for HandleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An opaque native window handle supplied by the platform enumerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeHandle(pub u64);

/// Platform window enumeration collaborator.
pub trait WindowEnumerator {
    /// Find a window matching the given class/title spec.
    fn find(&self, spec: &HandleSpec) -> Option<NativeHandle>;
}

/// What the resolved surface is addressed through.
#[derive(Debug, Clone)]
pub enum SurfaceTarget {
    Native(NativeHandle),
    Adb(AdbEndpoint),
}

/// A concrete, addressable control target after profile resolution.
#[derive(Debug, Clone)]
pub struct ResolvedSurface {
    target: SurfaceTarget,
    bounds: Rect,
    offset: Point,
    scale: f64,
}

impl ResolvedSurface {
    /// Assemble a surface directly, for callers that already hold a target
    /// and corrected bounds (the resolver is the usual entry point).
    pub fn new(target: SurfaceTarget, bounds: Rect, offset: Point) -> Self {
        Self {
            target,
            bounds,
            offset,
            scale: 1.0,
        }
    }

    /// Game-surface bounds, origin (0, 0), post offset correction.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn target(&self) -> &SurfaceTarget {
        &self.target
    }

    /// Override the coordinate scale, for devices whose actual display size
    /// differs from the profile's nominal size.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Translate a game-surface point to device coordinates.
    pub fn to_device(&self, point: Point) -> Point {
        Point::new(
            ((point.x + self.offset.x) as f64 * self.scale).round() as i32,
            ((point.y + self.offset.y) as f64 * self.scale).round() as i32,
        )
    }
}

/// Maps a logical handle kind and a device profile to a resolved surface.
pub struct HandleResolver<'a> {
    profile: &'a DeviceProfile,
    windows: &'a dyn WindowEnumerator,
}

impl<'a> HandleResolver<'a> {
    pub fn new(profile: &'a DeviceProfile, windows: &'a dyn WindowEnumerator) -> Self {
        Self { profile, windows }
    }

    /// Resolve the requested handle kind.
    ///
    /// ADB-backed profiles resolve to their connection endpoint for every
    /// kind; callers address the result uniformly either way. Native
    /// profiles try the specs for the kind in order; first hit wins.
    pub fn resolve(&self, kind: HandleKind) -> Result<ResolvedSurface, HandleError> {
        let bounds = self.profile.surface_bounds();
        let offset = self.profile.surface_offset();

        if let Some(spec) = &self.profile.adb {
            let endpoint = AdbEndpoint::from_spec(spec, &self.profile.name)?;
            debug!(profile = %self.profile.name, %kind, "resolved adb endpoint");
            return Ok(ResolvedSurface {
                target: SurfaceTarget::Adb(endpoint),
                bounds,
                offset,
                scale: 1.0,
            });
        }

        let specs = match kind {
            HandleKind::Window => &self.profile.window,
            HandleKind::View => &self.profile.view,
            HandleKind::Control => &self.profile.control,
        };

        for spec in specs {
            if let Some(handle) = self.windows.find(spec) {
                debug!(profile = %self.profile.name, %kind, handle = handle.0, "resolved native handle");
                return Ok(ResolvedSurface {
                    target: SurfaceTarget::Native(handle),
                    bounds,
                    offset,
                    scale: 1.0,
                });
            }
        }

        Err(HandleError::NotFound {
            kind,
            profile: self.profile.name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::AdbSpec;

    struct ClassLookup(Vec<(&'static str, u64)>);

    impl WindowEnumerator for ClassLookup {
        fn find(&self, spec: &HandleSpec) -> Option<NativeHandle> {
            self.0
                .iter()
                .find(|(class, _)| *class == spec.class)
                .map(|(_, handle)| NativeHandle(*handle))
        }
    }

    fn native_profile() -> DeviceProfile {
        DeviceProfile {
            name: "emu".into(),
            window: vec![
                HandleSpec {
                    class: "OldPlayer".into(),
                    title: String::new(),
                },
                HandleSpec {
                    class: "NewPlayer".into(),
                    title: String::new(),
                },
            ],
            view: vec![],
            control: vec![HandleSpec {
                class: "RenderView".into(),
                title: String::new(),
            }],
            adb: None,
            width: 1280,
            height: 760,
            left_offset: 2,
            top_offset: 40,
            right_offset: 2,
            bottom_offset: 0,
        }
    }

    #[test]
    fn test_resolve_tries_specs_in_order() {
        let profile = native_profile();
        let windows = ClassLookup(vec![("NewPlayer", 7), ("OldPlayer", 3)]);
        let surface = HandleResolver::new(&profile, &windows)
            .resolve(HandleKind::Window)
            .unwrap();
        match surface.target() {
            SurfaceTarget::Native(handle) => assert_eq!(handle.0, 3),
            other => panic!("expected native target, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_not_found() {
        let profile = native_profile();
        let windows = ClassLookup(vec![]);
        let err = HandleResolver::new(&profile, &windows)
            .resolve(HandleKind::View)
            .unwrap_err();
        assert!(matches!(
            err,
            HandleError::NotFound { kind: HandleKind::View, .. }
        ));
    }

    #[test]
    fn test_resolved_surface_applies_offsets() {
        let profile = native_profile();
        let windows = ClassLookup(vec![("RenderView", 9)]);
        let surface = HandleResolver::new(&profile, &windows)
            .resolve(HandleKind::Control)
            .unwrap();
        assert_eq!(surface.bounds(), Rect::new(0, 0, 1276, 720));
        assert_eq!(surface.to_device(Point::new(100, 100)), Point::new(102, 140));
    }

    #[test]
    fn test_adb_profile_resolves_to_endpoint_for_any_kind() {
        let mut profile = native_profile();
        profile.adb = Some(AdbSpec {
            path: "adb".into(),
            connect: "connect 127.0.0.1:7555".into(),
            click: "shell input tap {x} {y}".into(),
            capture: "exec-out screencap -p".into(),
            display: "shell wm size".into(),
            display_pattern: r"(\d+)x(\d+)".into(),
            display_width: 1280,
            display_height: 720,
        });
        let windows = ClassLookup(vec![]);
        let resolver = HandleResolver::new(&profile, &windows);
        for kind in [HandleKind::Window, HandleKind::View, HandleKind::Control] {
            let surface = resolver.resolve(kind).unwrap();
            assert!(matches!(surface.target(), SurfaceTarget::Adb(_)));
        }
    }

    #[test]
    fn test_scale_applied_after_offset() {
        let profile = native_profile();
        let windows = ClassLookup(vec![("RenderView", 9)]);
        let surface = HandleResolver::new(&profile, &windows)
            .resolve(HandleKind::Control)
            .unwrap()
            .with_scale(1.5);
        assert_eq!(surface.to_device(Point::new(100, 100)), Point::new(153, 210));
    }
}
