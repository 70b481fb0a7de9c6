//! CRC32 values of the stock Custom Edition multiplayer maps.
//!
//! Rebuilding a stock map with these CRCs keeps it joinable on servers that
//! check the map checksum.

const STOCK_CRCS: &[(&str, u32)] = &[
    ("beavercreek", 0x07B3_876A),
    ("bloodgulch", 0x7B30_9554),
    ("boardingaction", 0xF4DE_EF94),
    ("carousel", 0x9C30_1A08),
    ("chillout", 0x93C5_3C27),
    ("damnation", 0x0FBA_059D),
    ("dangercanyon", 0xC410_CD74),
    ("deathisland", 0x1DF8_C97F),
    ("gephyrophobia", 0xD287_2165),
    ("hangemhigh", 0xA7C8_B9C6),
    ("icefields", 0x5EC1_DEB7),
    ("infinity", 0x0E7F_7FE7),
    ("longest", 0xC8F4_8FF6),
    ("prisoner", 0x43B8_1A8B),
    ("putput", 0xAF2F_0B84),
    ("ratrace", 0xF7F8_E14C),
    ("sidewinder", 0xBD95_CF55),
    ("timberland", 0x5444_6470),
    ("wizard", 0xCF33_59B1),
];

/// Forged CRC32 of a stock map, by scenario name.
pub fn stock_crc(scenario_name: &str) -> Option<u32> {
    STOCK_CRCS
        .iter()
        .find(|(name, _)| *name == scenario_name)
        .map(|&(_, crc)| crc)
}
