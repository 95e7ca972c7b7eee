//! Rotation loop: detect (category, theme) changes and apply a wallpaper
//!
//! Single-threaded. The only suspension point is the sleep between ticks.

use chrono::Timelike;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::assets::AssetProvider;
use crate::category::CategoryResolver;
use crate::desktop::{DesktopApplier, ThemeProbe, ThemeVariant};

/// Source of the current hour (0-23)
pub trait Clock {
    fn hour(&self) -> u32;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn hour(&self) -> u32 {
        chrono::Local::now().hour()
    }
}

/// When a tick goes on to resolve and apply a wallpaper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// Only when the category or theme differs from the last tick (local pool)
    OnChange,
    /// Unconditionally (online source: every tick fetches a new image)
    EveryTick,
}

/// Collaborators borrowed for the lifetime of the loop
pub struct RotationContext<'a> {
    pub resolver: &'a CategoryResolver<'a>,
    pub clock: &'a dyn Clock,
    pub theme: &'a dyn ThemeProbe,
    pub assets: &'a dyn AssetProvider,
    pub applier: &'a dyn DesktopApplier,
    pub policy: RefreshPolicy,
    pub interval: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Category and theme unchanged
    Unchanged,
    /// No category could be resolved; state untouched
    Unresolved,
    /// Change detected but no wallpaper was available
    NoAsset,
    /// Wallpaper resolved but the applier rejected it
    ApplyFailed(PathBuf),
    Applied(PathBuf),
}

/// Remembered reading from the last tick that detected a change
///
/// Both fields are `None` until the first such tick and are always set together.
#[derive(Debug, Default)]
pub struct RotationState {
    previous_category: Option<String>,
    previous_theme: Option<ThemeVariant>,
}

impl RotationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous_category(&self) -> Option<&str> {
        self.previous_category.as_deref()
    }

    pub fn previous_theme(&self) -> Option<ThemeVariant> {
        self.previous_theme
    }

    pub fn tick(&mut self, ctx: &RotationContext) -> TickOutcome {
        // The local pool follows the clock; only online refreshes consult weather
        let hour = ctx.clock.hour();
        let resolved = match ctx.policy {
            RefreshPolicy::OnChange => ctx.resolver.resolve_by_time(hour),
            RefreshPolicy::EveryTick => ctx.resolver.resolve(hour),
        };
        let category = match resolved {
            Ok(category) => category,
            Err(e) => {
                warn!(error = %e, "Cannot determine category, skipping tick");
                return TickOutcome::Unresolved;
            }
        };
        let theme = ctx.theme.current_theme();

        let category_changed = self.previous_category.as_deref() != Some(category.as_str());
        let theme_changed = self.previous_theme != Some(theme);

        match ctx.policy {
            RefreshPolicy::OnChange if !category_changed && !theme_changed => {
                info!(category = %category, theme = %theme, "No change detected, waiting");
                return TickOutcome::Unchanged;
            }
            RefreshPolicy::OnChange => info!(
                category = %category,
                theme = %theme,
                category_changed,
                theme_changed,
                "Change detected, updating wallpaper"
            ),
            RefreshPolicy::EveryTick => {
                info!(category = %category, theme = %theme, "Refreshing wallpaper")
            }
        }

        let outcome = match ctx.assets.resolve(&category) {
            Some(path) => match ctx.applier.apply(&path) {
                Ok(()) => {
                    info!(path = %path.display(), theme = %theme, "Applied wallpaper");
                    TickOutcome::Applied(path)
                }
                Err(e) => {
                    warn!(error = %e, "Wallpaper not applied");
                    TickOutcome::ApplyFailed(path)
                }
            },
            None => {
                warn!(category = %category, "No wallpaper available, skipping change");
                TickOutcome::NoAsset
            }
        };

        self.previous_category = Some(category);
        self.previous_theme = Some(theme);
        outcome
    }
}

/// Run ticks until the process is terminated, or exactly one when `once`
pub fn run(ctx: &RotationContext, once: bool) {
    let mut state = RotationState::new();
    loop {
        let outcome = state.tick(ctx);
        debug!(
            outcome = ?outcome,
            previous_category = ?state.previous_category(),
            previous_theme = ?state.previous_theme(),
            "Tick finished"
        );

        if once {
            break;
        }
        thread::sleep(ctx.interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::config::settings::Mode;
    use crate::desktop::ApplyError;
    use crate::weather::{WeatherCondition, WeatherLookup};
    use std::cell::{Cell, RefCell};
    use std::path::Path;

    struct FixedClock(Cell<u32>);

    impl Clock for FixedClock {
        fn hour(&self) -> u32 {
            self.0.get()
        }
    }

    struct FakeTheme(Cell<ThemeVariant>);

    impl ThemeProbe for FakeTheme {
        fn current_theme(&self) -> ThemeVariant {
            self.0.get()
        }
    }

    #[derive(Default)]
    struct FakeAssets {
        empty: bool,
        requests: RefCell<Vec<String>>,
    }

    impl AssetProvider for FakeAssets {
        fn resolve(&self, category: &str) -> Option<PathBuf> {
            self.requests.borrow_mut().push(category.to_string());
            (!self.empty).then(|| PathBuf::from(format!("/walls/{category}.jpg")))
        }
    }

    struct ChangingWeather(Cell<Option<WeatherCondition>>);

    impl WeatherLookup for ChangingWeather {
        fn current_condition(&self) -> anyhow::Result<Option<WeatherCondition>> {
            Ok(self.0.get())
        }
    }

    #[derive(Default)]
    struct RecordingApplier {
        reject: bool,
        applied: RefCell<Vec<PathBuf>>,
    }

    impl DesktopApplier for RecordingApplier {
        fn apply(&self, path: &Path) -> Result<(), ApplyError> {
            if self.reject {
                return Err(ApplyError::WallpaperMissing(path.to_path_buf()));
            }
            self.applied.borrow_mut().push(path.to_path_buf());
            Ok(())
        }
    }

    struct Harness {
        config: Config,
        clock: FixedClock,
        theme: FakeTheme,
        assets: FakeAssets,
        applier: RecordingApplier,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                config: Config::from_json("{}").unwrap(),
                clock: FixedClock(Cell::new(9)),
                theme: FakeTheme(Cell::new(ThemeVariant::Light)),
                assets: FakeAssets::default(),
                applier: RecordingApplier::default(),
            }
        }

        fn run(
            &self,
            policy: RefreshPolicy,
            explicit: Option<&str>,
            state: &mut RotationState,
        ) -> TickOutcome {
            self.run_with_weather(policy, explicit, None, state)
        }

        fn run_with_weather(
            &self,
            policy: RefreshPolicy,
            explicit: Option<&str>,
            weather: Option<&dyn WeatherLookup>,
            state: &mut RotationState,
        ) -> TickOutcome {
            let resolver =
                CategoryResolver::new(&self.config, explicit.map(str::to_string), weather);
            let ctx = RotationContext {
                resolver: &resolver,
                clock: &self.clock,
                theme: &self.theme,
                assets: &self.assets,
                applier: &self.applier,
                policy,
                interval: Duration::from_secs(1),
            };
            state.tick(&ctx)
        }

        fn tick(&self, state: &mut RotationState) -> TickOutcome {
            self.run(RefreshPolicy::OnChange, None, state)
        }

        fn applied(&self) -> usize {
            self.applier.applied.borrow().len()
        }
    }

    #[test]
    fn test_first_tick_always_applies() {
        let harness = Harness::new();
        let mut state = RotationState::new();
        assert_eq!(state.previous_category(), None);
        assert_eq!(state.previous_theme(), None);

        let outcome = harness.tick(&mut state);
        assert_eq!(outcome, TickOutcome::Applied(PathBuf::from("/walls/morning.jpg")));
        assert_eq!(harness.applied(), 1);
        assert_eq!(state.previous_category(), Some("morning"));
        assert_eq!(state.previous_theme(), Some(ThemeVariant::Light));
    }

    #[test]
    fn test_unchanged_second_tick_is_noop() {
        let harness = Harness::new();
        let mut state = RotationState::new();

        harness.tick(&mut state);
        let outcome = harness.tick(&mut state);

        assert_eq!(outcome, TickOutcome::Unchanged);
        assert_eq!(harness.applied(), 1);
        assert_eq!(harness.assets.requests.borrow().len(), 1);
    }

    #[test]
    fn test_category_change_applies() {
        let harness = Harness::new();
        let mut state = RotationState::new();

        harness.tick(&mut state);
        harness.clock.0.set(13);
        let outcome = harness.tick(&mut state);

        assert_eq!(outcome, TickOutcome::Applied(PathBuf::from("/walls/afternoon.jpg")));
        assert_eq!(state.previous_category(), Some("afternoon"));
        assert_eq!(harness.applied(), 2);
    }

    #[test]
    fn test_theme_change_applies() {
        let harness = Harness::new();
        let mut state = RotationState::new();

        harness.tick(&mut state);
        harness.theme.0.set(ThemeVariant::Dark);
        let outcome = harness.tick(&mut state);

        assert_eq!(outcome, TickOutcome::Applied(PathBuf::from("/walls/morning.jpg")));
        assert_eq!(state.previous_theme(), Some(ThemeVariant::Dark));
        assert_eq!(harness.applied(), 2);
    }

    #[test]
    fn test_same_hour_bucket_is_unchanged() {
        let harness = Harness::new();
        let mut state = RotationState::new();

        harness.tick(&mut state);
        harness.clock.0.set(11);
        assert_eq!(harness.tick(&mut state), TickOutcome::Unchanged);
    }

    #[test]
    fn test_missing_asset_still_advances_state() {
        let mut harness = Harness::new();
        harness.assets.empty = true;
        let mut state = RotationState::new();

        assert_eq!(harness.tick(&mut state), TickOutcome::NoAsset);
        assert_eq!(state.previous_category(), Some("morning"));
        assert_eq!(state.previous_theme(), Some(ThemeVariant::Light));
        assert_eq!(harness.applied(), 0);

        // Not retried until something changes
        assert_eq!(harness.tick(&mut state), TickOutcome::Unchanged);
        assert_eq!(harness.assets.requests.borrow().len(), 1);
    }

    #[test]
    fn test_apply_failure_advances_state() {
        let mut harness = Harness::new();
        harness.applier.reject = true;
        let mut state = RotationState::new();

        assert_eq!(
            harness.tick(&mut state),
            TickOutcome::ApplyFailed(PathBuf::from("/walls/morning.jpg"))
        );
        assert_eq!(state.previous_category(), Some("morning"));
        assert_eq!(harness.tick(&mut state), TickOutcome::Unchanged);
    }

    #[test]
    fn test_unresolved_category_leaves_state() {
        let mut harness = Harness::new();
        harness.config.time_categories.morning = None;
        let mut state = RotationState::new();

        assert_eq!(harness.tick(&mut state), TickOutcome::Unresolved);
        assert_eq!(state.previous_category(), None);
        assert_eq!(state.previous_theme(), None);
        assert!(harness.assets.requests.borrow().is_empty());
    }

    #[test]
    fn test_explicit_category_used() {
        let harness = Harness::new();
        let mut state = RotationState::new();

        let outcome = harness.run(RefreshPolicy::OnChange, Some("cars"), &mut state);
        assert_eq!(outcome, TickOutcome::Applied(PathBuf::from("/walls/cars.jpg")));
    }

    #[test]
    fn test_every_tick_policy_refreshes_unconditionally() {
        let harness = Harness::new();
        let mut state = RotationState::new();

        for _ in 0..3 {
            let outcome = harness.run(RefreshPolicy::EveryTick, None, &mut state);
            assert!(matches!(outcome, TickOutcome::Applied(_)));
        }
        assert_eq!(harness.applied(), 3);
        assert_eq!(harness.assets.requests.borrow().len(), 3);
    }

    #[test]
    fn test_run_once_performs_single_tick() {
        let harness = Harness::new();
        let resolver = CategoryResolver::new(&harness.config, None, None);
        let ctx = RotationContext {
            resolver: &resolver,
            clock: &harness.clock,
            theme: &harness.theme,
            assets: &harness.assets,
            applier: &harness.applier,
            policy: RefreshPolicy::OnChange,
            interval: Duration::from_secs(3600),
        };

        run(&ctx, true);
        assert_eq!(harness.applied(), 1);
    }

    #[test]
    fn test_local_pool_ignores_weather_changes() {
        let mut harness = Harness::new();
        harness.config.mode = Mode::Weather;
        harness.config.use_weather = true;
        let weather = ChangingWeather(Cell::new(Some(WeatherCondition::Rainy)));
        let mut state = RotationState::new();

        let first =
            harness.run_with_weather(RefreshPolicy::OnChange, None, Some(&weather), &mut state);
        assert_eq!(first, TickOutcome::Applied(PathBuf::from("/walls/morning.jpg")));

        weather.0.set(Some(WeatherCondition::Sunny));
        let second =
            harness.run_with_weather(RefreshPolicy::OnChange, None, Some(&weather), &mut state);
        assert_eq!(second, TickOutcome::Unchanged);
        assert_eq!(harness.applied(), 1);
    }

    #[test]
    fn test_online_refresh_uses_weather() {
        let mut harness = Harness::new();
        harness.config.mode = Mode::Weather;
        harness.config.use_weather = true;
        let weather = ChangingWeather(Cell::new(Some(WeatherCondition::Cloudy)));
        let mut state = RotationState::new();

        let outcome =
            harness.run_with_weather(RefreshPolicy::EveryTick, None, Some(&weather), &mut state);
        assert_eq!(outcome, TickOutcome::Applied(PathBuf::from("/walls/cloudy.jpg")));
    }
}
