//! Scroll specifications and the synthetic events they expand to.

use super::keys::NavigationKey;
use crate::capture::Region;

/// How content is advanced between shots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollPolicy {
    #[default]
    Disabled,
    /// Scroll the wheel by a fixed number of pixels.
    WheelByAmount(u32),
    /// Scroll the wheel by the height of the captured region.
    WheelByRegionHeight,
    /// Press a navigation key once.
    Key(NavigationKey),
}

impl ScrollPolicy {
    /// Resolves the policy against the capture region.
    ///
    /// Returns `None` when scrolling is disabled or would not move anything.
    pub fn resolve(&self, region: &Region) -> Option<ScrollSpec> {
        match *self {
            ScrollPolicy::Disabled => None,
            ScrollPolicy::WheelByAmount(0) => None,
            ScrollPolicy::WheelByAmount(pixels) => Some(ScrollSpec::Wheel {
                pixels: i32::try_from(pixels).unwrap_or(i32::MAX),
            }),
            ScrollPolicy::WheelByRegionHeight if region.height > 0 => Some(ScrollSpec::Wheel {
                pixels: region.height,
            }),
            ScrollPolicy::WheelByRegionHeight => None,
            ScrollPolicy::Key(key) => Some(ScrollSpec::Key(key)),
        }
    }
}

/// One scroll action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollSpec {
    Key(NavigationKey),
    /// Positive `pixels` moves content down (towards the end of the page).
    Wheel { pixels: i32 },
}

/// Low-level event posted to the system input queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntheticEvent {
    KeyDown(u16),
    KeyUp(u16),
    /// Vertical wheel delta. Negative values move content down.
    Wheel { delta_y: i32 },
}

impl ScrollSpec {
    /// Expands this scroll into the events that make up exactly one action.
    pub fn events(&self) -> Vec<SyntheticEvent> {
        match *self {
            ScrollSpec::Key(key) => {
                let code = key.key_code();
                vec![SyntheticEvent::KeyDown(code), SyntheticEvent::KeyUp(code)]
            }
            ScrollSpec::Wheel { pixels } => vec![SyntheticEvent::Wheel {
                delta_y: pixels.saturating_neg(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_delta_is_negated_amount() {
        let spec = ScrollSpec::Wheel { pixels: 300 };
        assert_eq!(spec.events(), vec![SyntheticEvent::Wheel { delta_y: -300 }]);
    }

    #[test]
    fn key_press_is_down_then_up() {
        let spec = ScrollSpec::Key(NavigationKey::Space);
        assert_eq!(
            spec.events(),
            vec![SyntheticEvent::KeyDown(57), SyntheticEvent::KeyUp(57)]
        );
    }

    #[test]
    fn region_height_policy_uses_region() {
        let region = Region::new(0, 0, 800, 600);
        assert_eq!(
            ScrollPolicy::WheelByRegionHeight.resolve(&region),
            Some(ScrollSpec::Wheel { pixels: 600 })
        );
        assert_eq!(ScrollPolicy::Disabled.resolve(&region), None);
        assert_eq!(ScrollPolicy::WheelByAmount(0).resolve(&region), None);
    }
}
