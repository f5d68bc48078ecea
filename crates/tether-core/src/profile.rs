//! Declarative chain profile: visuals, link physics, joint constraints, LOD
//! table, network hints and behavior flags.
//!
//! A [`ChainProfile`] is authored once (usually as TOML) and shared by every
//! chain instance built from it. It is plain data; the only logic here is
//! clamping queries and load-time validation.

use bevy::prelude::{Quat, Transform, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::network::NetworkSettings;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_true() -> bool {
    true
}
const fn default_segment_count() -> i32 {
    8
}
const fn default_length() -> f32 {
    500.0
}
const fn default_identity_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}
const fn default_unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}
const fn default_link_mass() -> f32 {
    1.0
}
const fn default_damping() -> f32 {
    0.1
}
const fn default_link_radius() -> f32 {
    2.0
}
const fn default_swing_angle() -> f32 {
    45.0
}
const fn default_twist_angle() -> f32 {
    20.0
}
const fn default_stiffness() -> f32 {
    50_000.0
}
const fn default_max_distance() -> f32 {
    10_000.0
}
const fn default_rate_factor() -> f32 {
    1.0
}
fn default_lod_levels() -> Vec<LodLevel> {
    vec![LodLevel {
        max_distance: DEFAULT_LOD_MAX_DISTANCE,
        ..LodLevel::default()
    }]
}

/// Upper bound of the single LOD level every default profile carries.
pub const DEFAULT_LOD_MAX_DISTANCE: f32 = 100_000.0;

/// Smallest segment count any chain is ever built with.
pub const MIN_SEGMENT_COUNT: usize = 2;

/// Largest segment count any chain is ever built with.
pub const MAX_SEGMENT_COUNT: usize = 256;

// ---------------------------------------------------------------------------
// ChainType
// ---------------------------------------------------------------------------

/// High-level classification of a chain. Used for presets and tooling, it
/// does not change how a chain is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainType {
    #[default]
    Rope,
    MetalChain,
    Grapple,
    Restraint,
    Custom,
}

// ---------------------------------------------------------------------------
// LinkTransform
// ---------------------------------------------------------------------------

/// Relative transform applied to each link mesh, stored as plain arrays so
/// profiles stay engine-neutral on disk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkTransform {
    #[serde(default)]
    pub translation: [f32; 3],
    /// Quaternion `[x, y, z, w]`.
    #[serde(default = "default_identity_rotation")]
    pub rotation: [f32; 4],
    #[serde(default = "default_unit_scale")]
    pub scale: [f32; 3],
}

impl Default for LinkTransform {
    fn default() -> Self {
        Self {
            translation: [0.0; 3],
            rotation: default_identity_rotation(),
            scale: default_unit_scale(),
        }
    }
}

impl LinkTransform {
    /// Convert to a Bevy [`Transform`]. A zero-length rotation falls back to
    /// identity.
    pub fn to_transform(&self) -> Transform {
        let [x, y, z, w] = self.rotation;
        let rotation = Quat::from_xyzw(x, y, z, w);
        let rotation = if rotation.length_squared() > f32::EPSILON {
            rotation.normalize()
        } else {
            Quat::IDENTITY
        };
        Transform {
            translation: Vec3::from_array(self.translation),
            rotation,
            scale: Vec3::from_array(self.scale),
        }
    }
}

// ---------------------------------------------------------------------------
// VisualSettings
// ---------------------------------------------------------------------------

/// Visual and geometric settings for the links composing a chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualSettings {
    /// Mesh asset used for every link, oriented along +X.
    #[serde(default)]
    pub link_mesh: Option<String>,
    #[serde(default)]
    pub link_relative_transform: LinkTransform,
    /// Segment count before LOD overrides. Queries clamp it to >= 2.
    #[serde(default = "default_segment_count")]
    pub default_segment_count: i32,
    /// Total chain length in world units before runtime overrides.
    #[serde(default = "default_length")]
    pub default_length: f32,
    #[serde(default = "default_true")]
    pub uniform_segment_length: bool,
}

impl Default for VisualSettings {
    fn default() -> Self {
        Self {
            link_mesh: None,
            link_relative_transform: LinkTransform::default(),
            default_segment_count: default_segment_count(),
            default_length: default_length(),
            uniform_segment_length: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Collision
// ---------------------------------------------------------------------------

/// Built-in collision channels a link body can belong to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionChannel {
    WorldStatic,
    WorldDynamic,
    Pawn,
    #[default]
    PhysicsBody,
    Vehicle,
    Destructible,
    /// Game-defined channel, `0..26`.
    Custom(u8),
}

impl CollisionChannel {
    /// Bit index of this channel in a 32-bit membership mask.
    pub const fn bit(self) -> u32 {
        match self {
            Self::WorldStatic => 0,
            Self::WorldDynamic => 1,
            Self::Pawn => 2,
            Self::PhysicsBody => 3,
            Self::Vehicle => 4,
            Self::Destructible => 5,
            Self::Custom(n) => 6 + (n as u32 % 26),
        }
    }
}

/// Effective collision classification of a link.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CollisionClass {
    /// A named collision profile resolved by the host.
    Profile(String),
    Channel(CollisionChannel),
}

// ---------------------------------------------------------------------------
// LinkPhysicsSettings
// ---------------------------------------------------------------------------

/// Rigid-body properties applied to every link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkPhysicsSettings {
    /// Mass of each link in kilograms.
    #[serde(default = "default_link_mass")]
    pub link_mass: f32,
    #[serde(default = "default_damping")]
    pub linear_damping: f32,
    #[serde(default = "default_damping")]
    pub angular_damping: f32,
    #[serde(default)]
    pub collision_channel: CollisionChannel,
    /// Named collision profile. When set it overrides `collision_channel`.
    #[serde(default)]
    pub collision_profile: Option<String>,
    /// If true, links of the same chain collide with each other.
    #[serde(default)]
    pub enable_self_collision: bool,
    /// Radius of the capsule collider hosts give each link.
    #[serde(default = "default_link_radius")]
    pub link_radius: f32,
}

impl Default for LinkPhysicsSettings {
    fn default() -> Self {
        Self {
            link_mass: default_link_mass(),
            linear_damping: default_damping(),
            angular_damping: default_damping(),
            collision_channel: CollisionChannel::default(),
            collision_profile: None,
            enable_self_collision: false,
            link_radius: default_link_radius(),
        }
    }
}

impl LinkPhysicsSettings {
    /// Named profile wins over the channel when it is set and non-empty.
    pub fn collision_class(&self) -> CollisionClass {
        match self.collision_profile.as_deref() {
            Some(name) if !name.is_empty() => CollisionClass::Profile(name.to_owned()),
            _ => CollisionClass::Channel(self.collision_channel),
        }
    }
}

// ---------------------------------------------------------------------------
// ConstraintSettings
// ---------------------------------------------------------------------------

/// Joint settings between two adjacent links. Angles are in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSettings {
    #[serde(default = "default_true")]
    pub enable_swing: bool,
    #[serde(default = "default_swing_angle")]
    pub max_swing_angle: f32,
    #[serde(default)]
    pub enable_twist: bool,
    #[serde(default = "default_twist_angle")]
    pub max_twist_angle: f32,
    /// Linear distance limit between two links. `0` leaves the axes free.
    #[serde(default)]
    pub linear_limit: f32,
    #[serde(default = "default_stiffness")]
    pub linear_stiffness: f32,
    #[serde(default = "default_stiffness")]
    pub angular_stiffness: f32,
    /// Force at which the joint breaks. `0` = unbreakable.
    #[serde(default)]
    pub break_force: f32,
    /// Torque at which the joint breaks. `0` = unbreakable.
    #[serde(default)]
    pub break_torque: f32,
}

impl Default for ConstraintSettings {
    fn default() -> Self {
        Self {
            enable_swing: true,
            max_swing_angle: default_swing_angle(),
            enable_twist: false,
            max_twist_angle: default_twist_angle(),
            linear_limit: 0.0,
            linear_stiffness: default_stiffness(),
            angular_stiffness: default_stiffness(),
            break_force: 0.0,
            break_torque: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// LodLevel
// ---------------------------------------------------------------------------

/// One row of the distance-keyed LOD table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LodLevel {
    #[serde(default)]
    pub min_distance: f32,
    #[serde(default = "default_max_distance")]
    pub max_distance: f32,
    /// Segment count at this level. `<= 0` uses the profile default.
    #[serde(default)]
    pub segment_count_override: i32,
    #[serde(default = "default_true")]
    pub simulate_physics: bool,
    #[serde(default = "default_true")]
    pub enable_collisions: bool,
    /// `1.0` = step every frame, `0.5` = every other frame.
    #[serde(default = "default_rate_factor")]
    pub simulation_rate_factor: f32,
}

impl Default for LodLevel {
    fn default() -> Self {
        Self {
            min_distance: 0.0,
            max_distance: default_max_distance(),
            segment_count_override: 0,
            simulate_physics: true,
            enable_collisions: true,
            simulation_rate_factor: default_rate_factor(),
        }
    }
}

impl LodLevel {
    /// Inclusive range test.
    pub fn contains(&self, distance: f32) -> bool {
        distance >= self.min_distance && distance <= self.max_distance
    }
}

// ---------------------------------------------------------------------------
// ChainProfile
// ---------------------------------------------------------------------------

/// Reusable chain configuration shared by chain instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub chain_type: ChainType,
    #[serde(default)]
    pub visual: VisualSettings,
    #[serde(default)]
    pub physics: LinkPhysicsSettings,
    #[serde(default)]
    pub constraint: ConstraintSettings,
    /// Scanned in order; the first level containing the distance wins.
    #[serde(default = "default_lod_levels")]
    pub lod_levels: Vec<LodLevel>,
    #[serde(default)]
    pub network: NetworkSettings,
    /// If true, the last link is left free instead of bound to the end anchor.
    #[serde(default = "default_true")]
    pub supports_loose_end: bool,
    #[serde(default = "default_true")]
    pub allow_dynamic_length_change: bool,
    /// If true, links are laid out in world space between the anchors on
    /// every rebuild. If false they keep the authored relative pose.
    #[serde(default = "default_true")]
    pub use_world_space_rest_pose: bool,
}

impl Default for ChainProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            chain_type: ChainType::default(),
            visual: VisualSettings::default(),
            physics: LinkPhysicsSettings::default(),
            constraint: ConstraintSettings::default(),
            lod_levels: default_lod_levels(),
            network: NetworkSettings::default(),
            supports_loose_end: true,
            allow_dynamic_length_change: true,
            use_world_space_rest_pose: true,
        }
    }
}

/// Clamp a segment count into [`MIN_SEGMENT_COUNT`]`..=`[`MAX_SEGMENT_COUNT`].
pub fn clamp_segment_count(count: usize) -> usize {
    count.clamp(MIN_SEGMENT_COUNT, MAX_SEGMENT_COUNT)
}

impl ChainProfile {
    /// Segment count ignoring LOD, clamped to
    /// [`MIN_SEGMENT_COUNT`]`..=`[`MAX_SEGMENT_COUNT`].
    #[allow(clippy::cast_sign_loss)]
    pub fn base_segment_count(&self) -> usize {
        clamp_segment_count(self.visual.default_segment_count.max(0) as usize)
    }

    /// Chain length ignoring runtime overrides, clamped to at least 1.
    pub fn base_length(&self) -> f32 {
        self.visual.default_length.max(1.0)
    }

    /// Length of one segment at the base segment count.
    #[allow(clippy::cast_precision_loss)]
    pub fn segment_length(&self) -> f32 {
        self.base_length() / self.base_segment_count() as f32
    }

    /// Check every authored value against its documented range.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn validate(&self) -> Result<(), ConfigError> {
        let v = &self.visual;
        if v.default_segment_count < MIN_SEGMENT_COUNT as i32
            || v.default_segment_count > MAX_SEGMENT_COUNT as i32
        {
            return Err(ConfigError::InvalidSegmentCount(v.default_segment_count));
        }
        check_at_least("visual.default_length", v.default_length, 1.0)?;

        let p = &self.physics;
        check_positive("physics.link_mass", p.link_mass)?;
        check_non_negative("physics.linear_damping", p.linear_damping)?;
        check_non_negative("physics.angular_damping", p.angular_damping)?;
        check_positive("physics.link_radius", p.link_radius)?;

        let c = &self.constraint;
        check_angle("constraint.max_swing_angle", c.max_swing_angle)?;
        check_angle("constraint.max_twist_angle", c.max_twist_angle)?;
        check_non_negative("constraint.linear_limit", c.linear_limit)?;
        check_non_negative("constraint.linear_stiffness", c.linear_stiffness)?;
        check_non_negative("constraint.angular_stiffness", c.angular_stiffness)?;
        check_non_negative("constraint.break_force", c.break_force)?;
        check_non_negative("constraint.break_torque", c.break_torque)?;

        for (index, lod) in self.lod_levels.iter().enumerate() {
            let ordered = lod.min_distance >= 0.0 && lod.min_distance <= lod.max_distance;
            if !ordered {
                return Err(ConfigError::InvalidLodRange {
                    index,
                    min: lod.min_distance,
                    max: lod.max_distance,
                });
            }
            if lod.segment_count_override < 0
                || lod.segment_count_override > MAX_SEGMENT_COUNT as i32
            {
                return Err(ConfigError::invalid(
                    "lod_levels.segment_count_override",
                    format!("level {index} must be in [0, {MAX_SEGMENT_COUNT}]"),
                ));
            }
            if lod.simulation_rate_factor.is_nan() || lod.simulation_rate_factor < 0.01 {
                return Err(ConfigError::invalid(
                    "lod_levels.simulation_rate_factor",
                    format!("level {index} must be >= 0.01"),
                ));
            }
        }

        self.network.validate()
    }

    /// Parse and validate a profile from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let profile: Self = toml::from_str(content)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

fn check_non_negative(field: &str, value: f32) -> Result<(), ConfigError> {
    check_at_least(field, value, 0.0)
}

fn check_at_least(field: &str, value: f32, min: f32) -> Result<(), ConfigError> {
    if value >= min {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be >= {min}")))
    }
}

fn check_positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, "must be > 0"))
    }
}

fn check_angle(field: &str, degrees: f32) -> Result<(), ConfigError> {
    if (0.0..=180.0).contains(&degrees) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, "must be within [0, 180] degrees"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
