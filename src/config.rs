//! Engine options and their persistence
//!
//! Every knob the engine recognizes, each independently settable, with the
//! defaults the engine was designed around. Options can be persisted to
//! `~/.config/dragsort/options.yaml`; a missing or unparseable file falls
//! back to defaults with a warning, never an error.

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use crate::dom::Selector;

/// Cross-list group membership: a name plus pull/put rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    /// Items may be pulled out of this container
    #[serde(default = "default_true")]
    pub pull: bool,
    /// Items from a same-named group may be put into this container
    #[serde(default = "default_true")]
    pub put: bool,
}

/// Accepts either a bare group name or a full rule object in YAML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupSpec {
    Name(String),
    Rules(Group),
}

impl GroupSpec {
    pub fn resolved(&self) -> Group {
        match self {
            GroupSpec::Name(name) => Group {
                name: name.clone(),
                pull: true,
                put: true,
            },
            GroupSpec::Rules(g) => g.clone(),
        }
    }
}

/// Offset added to the ghost's displacement in fallback mode
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FallbackOffset {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// Recognized engine configuration (spec'd defaults)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortOptions {
    /// Which children of the container are reorderable
    pub draggable: Selector,
    /// Restrict drag starts to presses within this descendant, if set
    pub handle: Option<Selector>,
    /// Presses on matching elements never start a drag
    pub filter: Option<Selector>,
    /// Whether a filtered press is swallowed (vs. bubbling to the host)
    pub prevent_on_filter: bool,
    /// Cross-list group membership
    pub group: Option<GroupSpec>,
    pub disabled: bool,
    /// Press-and-hold delay before the drag may start (ms)
    pub delay_ms: u64,
    /// Apply `delay_ms` only to touch input
    pub delay_on_touch_only: bool,
    /// Movement allowed during the delay window before the start is cancelled (px)
    pub touch_start_threshold: f64,
    /// Fraction of the target's length, centered on its midpoint, inside
    /// which no placement decision is made. 1.0 removes the dead-zone.
    pub swap_threshold: f64,
    /// Move decision zones to the target's edges instead of its center
    pub invert_swap: bool,
    /// Zone fraction for inverted mode; defaults to `swap_threshold`
    pub inverted_swap_threshold: Option<f64>,
    /// FLIP animation duration (ms); 0 disables animation entirely
    pub animation_ms: u64,
    /// Easing hint recorded on animations for the host renderer
    pub easing: Option<String>,
    pub ghost_class: String,
    pub chosen_class: String,
    pub drag_class: String,
    pub fallback_class: String,
    /// Always use the synthesized pointer fallback, even with native support
    pub force_fallback: bool,
    /// Append the fallback ghost to the tree root instead of the container's parent
    pub fallback_on_body: bool,
    pub fallback_offset: FallbackOffset,
    /// Auto-scroll scrollable ancestors during a drag
    pub scroll: bool,
    /// Edge proximity (px) that activates auto-scroll
    pub scroll_sensitivity: f64,
    /// Pixels scrolled per auto-scroll tick (times velocity)
    pub scroll_speed: f64,
    /// Keep walking up through nested scroll containers
    pub bubble_scroll: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            draggable: Selector::Any,
            handle: None,
            filter: None,
            prevent_on_filter: true,
            group: None,
            disabled: false,
            delay_ms: 0,
            delay_on_touch_only: false,
            touch_start_threshold: 1.0,
            swap_threshold: 1.0,
            invert_swap: false,
            inverted_swap_threshold: None,
            animation_ms: 150,
            easing: None,
            ghost_class: "sortable-ghost".to_string(),
            chosen_class: "sortable-chosen".to_string(),
            drag_class: "sortable-drag".to_string(),
            fallback_class: "sortable-fallback".to_string(),
            force_fallback: false,
            fallback_on_body: false,
            fallback_offset: FallbackOffset::default(),
            scroll: true,
            scroll_sensitivity: 30.0,
            scroll_speed: 10.0,
            bubble_scroll: true,
        }
    }
}

impl SortOptions {
    /// Swap threshold clamped into the valid (0, 1] range
    pub fn effective_swap_threshold(&self) -> f64 {
        if self.swap_threshold <= 0.0 {
            1.0
        } else {
            self.swap_threshold.min(1.0)
        }
    }

    /// Inverted-mode threshold, falling back to the swap threshold
    pub fn effective_inverted_threshold(&self) -> f64 {
        self.inverted_swap_threshold
            .unwrap_or_else(|| self.effective_swap_threshold())
            .clamp(0.0, 1.0)
    }

    pub fn resolved_group(&self) -> Option<Group> {
        self.group.as_ref().map(GroupSpec::resolved)
    }

    /// Load options from disk, or return defaults if missing/unparseable
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::options_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        if !path.exists() {
            tracing::debug!("Options file not found at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(options) => {
                tracing::info!("Loaded options from {}", path.display());
                options
            }
            Err(e) => {
                tracing::warn!("Failed to load options at {}: {e:#}", path.display());
                Self::default()
            }
        }
    }

    /// Parse options from a specific file
    pub fn load_from(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Save options to disk, creating the config directory if needed
    pub fn save(&self) -> anyhow::Result<()> {
        let path = crate::config_paths::options_file()
            .ok_or_else(|| anyhow!("no config directory available"))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let content = serde_yaml::to_string(self).context("serializing options")?;
        std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!("Saved options to {}", path.display());
        Ok(())
    }
}
