//! Tag classes.
//!
//! The class set is fixed by the engine, so it is a plain enum. Each class has
//! a four-character code (stored as a big-endian `u32`, the way the engine
//! compares them), a file extension, and an optional parent class used for
//! the secondary/tertiary slots of the tag array.

use serde::{Deserialize, Serialize};

macro_rules! tag_classes {
    ($($variant:ident => ($code:literal, $ext:literal, $parent:expr)),* $(,)?) => {
        /// Tag class.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum TagClass {
            $($variant,)*
        }

        impl TagClass {
            /// Every class, in declaration order.
            pub const ALL: &'static [TagClass] = &[$(TagClass::$variant,)*];

            /// Four-character code, big-endian (`b"scnr"` -> `0x73636E72`).
            pub fn fourcc(self) -> u32 {
                match self {
                    $(TagClass::$variant => u32::from_be_bytes(*$code),)*
                }
            }

            /// File extension of tags of this class (no leading dot).
            pub fn extension(self) -> &'static str {
                match self {
                    $(TagClass::$variant => $ext,)*
                }
            }

            /// Parent class, if any.
            pub fn parent(self) -> Option<TagClass> {
                match self {
                    $(TagClass::$variant => $parent,)*
                }
            }
        }
    };
}

use TagClass as C;

tag_classes! {
    Actor => (b"actr", "actor", None),
    ActorVariant => (b"actv", "actor_variant", None),
    Antenna => (b"ant!", "antenna", None),
    Biped => (b"bipd", "biped", Some(C::Unit)),
    Bitmap => (b"bitm", "bitmap", None),
    CameraTrack => (b"trak", "camera_track", None),
    ColorTable => (b"colo", "color_table", None),
    ContinuousDamageEffect => (b"cdmg", "continuous_damage_effect", None),
    Contrail => (b"cont", "contrail", None),
    DamageEffect => (b"jpt!", "damage_effect", None),
    Decal => (b"deca", "decal", None),
    DetailObjectCollection => (b"dobc", "detail_object_collection", None),
    Device => (b"devi", "device", Some(C::Object)),
    DeviceControl => (b"ctrl", "device_control", Some(C::Device)),
    DeviceLightFixture => (b"lifi", "device_light_fixture", Some(C::Device)),
    DeviceMachine => (b"mach", "device_machine", Some(C::Device)),
    Dialogue => (b"udlg", "dialogue", None),
    Effect => (b"effe", "effect", None),
    Equipment => (b"eqip", "equipment", Some(C::Item)),
    Flag => (b"flag", "flag", None),
    Fog => (b"fog ", "fog", None),
    Font => (b"font", "font", None),
    Garbage => (b"garb", "garbage", Some(C::Item)),
    Gbxmodel => (b"mod2", "gbxmodel", None),
    Globals => (b"matg", "globals", None),
    Glow => (b"glw!", "glow", None),
    GrenadeHudInterface => (b"grhi", "grenade_hud_interface", None),
    HudGlobals => (b"hudg", "hud_globals", None),
    HudMessageText => (b"hmt ", "hud_message_text", None),
    HudNumber => (b"hud#", "hud_number", None),
    InputDeviceDefaults => (b"devc", "input_device_defaults", None),
    Item => (b"item", "item", Some(C::Object)),
    ItemCollection => (b"itmc", "item_collection", None),
    LensFlare => (b"lens", "lens_flare", None),
    Light => (b"ligh", "light", None),
    LightVolume => (b"mgs2", "light_volume", None),
    Lightning => (b"elec", "lightning", None),
    MaterialEffects => (b"foot", "material_effects", None),
    Meter => (b"metr", "meter", None),
    Model => (b"mode", "model", None),
    ModelAnimations => (b"antr", "model_animations", None),
    ModelCollisionGeometry => (b"coll", "model_collision_geometry", None),
    MultiplayerScenarioDescription => (b"mply", "multiplayer_scenario_description", None),
    Object => (b"obj ", "object", None),
    Particle => (b"part", "particle", None),
    ParticleSystem => (b"pctl", "particle_system", None),
    Physics => (b"phys", "physics", None),
    Placeholder => (b"plac", "placeholder", Some(C::Object)),
    PointPhysics => (b"pphy", "point_physics", None),
    Projectile => (b"proj", "projectile", Some(C::Object)),
    Scenario => (b"scnr", "scenario", None),
    ScenarioStructureBsp => (b"sbsp", "scenario_structure_bsp", None),
    Scenery => (b"scen", "scenery", Some(C::Object)),
    Shader => (b"shdr", "shader", None),
    ShaderEnvironment => (b"senv", "shader_environment", Some(C::Shader)),
    ShaderModel => (b"soso", "shader_model", Some(C::Shader)),
    ShaderTransparentChicago => (b"schi", "shader_transparent_chicago", Some(C::Shader)),
    ShaderTransparentChicagoExtended => (b"scex", "shader_transparent_chicago_extended", Some(C::Shader)),
    ShaderTransparentGeneric => (b"sotr", "shader_transparent_generic", Some(C::Shader)),
    ShaderTransparentGlass => (b"sgla", "shader_transparent_glass", Some(C::Shader)),
    ShaderTransparentMeter => (b"smet", "shader_transparent_meter", Some(C::Shader)),
    ShaderTransparentPlasma => (b"spla", "shader_transparent_plasma", Some(C::Shader)),
    ShaderTransparentWater => (b"swat", "shader_transparent_water", Some(C::Shader)),
    Sky => (b"sky ", "sky", None),
    Sound => (b"snd!", "sound", None),
    SoundEnvironment => (b"snde", "sound_environment", None),
    SoundLooping => (b"lsnd", "sound_looping", None),
    SoundScenery => (b"ssce", "sound_scenery", Some(C::Object)),
    StringList => (b"str#", "string_list", None),
    TagCollection => (b"tagc", "tag_collection", None),
    UiWidgetCollection => (b"Soul", "ui_widget_collection", None),
    UiWidgetDefinition => (b"DeLa", "ui_widget_definition", None),
    UnicodeStringList => (b"ustr", "unicode_string_list", None),
    Unit => (b"unit", "unit", Some(C::Object)),
    UnitHudInterface => (b"unhi", "unit_hud_interface", None),
    Vehicle => (b"vehi", "vehicle", Some(C::Unit)),
    VirtualKeyboard => (b"vcky", "virtual_keyboard", None),
    Weapon => (b"weap", "weapon", Some(C::Item)),
    WeaponHudInterface => (b"wphi", "weapon_hud_interface", None),
    WeatherParticleSystem => (b"rain", "weather_particle_system", None),
    Wind => (b"wind", "wind", None),
}

impl TagClass {
    /// Look up a class by file extension (with or without the leading dot).
    pub fn from_extension(extension: &str) -> Option<TagClass> {
        let extension = extension.strip_prefix('.').unwrap_or(extension);
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.extension().eq_ignore_ascii_case(extension))
    }

    /// Look up a class by four-character code.
    pub fn from_fourcc(fourcc: u32) -> Option<TagClass> {
        Self::ALL.iter().copied().find(|c| c.fourcc() == fourcc)
    }

    /// Abstract classes never have tag files of their own; references using
    /// them resolve to one of their concrete subclasses.
    pub fn is_abstract(self) -> bool {
        matches!(
            self,
            TagClass::Object | TagClass::Unit | TagClass::Item | TagClass::Device | TagClass::Shader
        )
    }

    /// Whether `self` is `ancestor` or descends from it.
    pub fn is_a(self, ancestor: TagClass) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if class == ancestor {
                return true;
            }
            current = class.parent();
        }
        false
    }

    /// Concrete classes a reference of this class may resolve to, in
    /// declaration order. A concrete class resolves only to itself.
    pub fn concrete_classes(self) -> Vec<TagClass> {
        if !self.is_abstract() {
            return vec![self];
        }
        Self::ALL
            .iter()
            .copied()
            .filter(|c| !c.is_abstract() && c.is_a(self))
            .collect()
    }

    /// Primary, secondary and tertiary class codes for the tag array.
    pub fn class_chain(self) -> [u32; 3] {
        let mut chain = [crate::NULL_CLASS; 3];
        let mut current = Some(self);
        for slot in &mut chain {
            let Some(class) = current else { break };
            *slot = class.fourcc();
            current = class.parent();
        }
        chain
    }

    /// Whether the engine keeps this class's tag data in the localization
    /// resource map.
    pub fn is_localization(self) -> bool {
        matches!(
            self,
            TagClass::Font | TagClass::UnicodeStringList | TagClass::HudMessageText
        )
    }
}

impl std::fmt::Display for TagClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Render a four-character code for display (`0x73636E72` -> `"scnr"`).
///
/// Non-printable bytes become `?`.
pub fn fourcc_to_string(fourcc: u32) -> String {
    fourcc
        .to_be_bytes()
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' })
        .collect()
}
