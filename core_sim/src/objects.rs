//! Static object definitions priced by construction commands.
//!
//! A full game loads these from object packs; the engine only needs the cost
//! shape, so a small built-in table per object class stands in for the
//! loader.

/// A plantable tree type.
#[derive(Debug, Clone, Copy)]
pub struct TreeObject {
    pub label: &'static str,
    pub build_cost_factor: i32,
    pub clear_cost_factor: i32,
    pub cost_index: u8,
}

pub const TREE_OBJECTS: &[TreeObject] = &[
    TreeObject {
        label: "scots pine",
        build_cost_factor: 40,
        clear_cost_factor: 24,
        cost_index: 5,
    },
    TreeObject {
        label: "european oak",
        build_cost_factor: 64,
        clear_cost_factor: 36,
        cost_index: 5,
    },
    TreeObject {
        label: "silver birch",
        build_cost_factor: 48,
        clear_cost_factor: 28,
        cost_index: 5,
    },
    TreeObject {
        label: "norway spruce",
        build_cost_factor: 44,
        clear_cost_factor: 26,
        cost_index: 5,
    },
];

/// A free-standing wall type.
#[derive(Debug, Clone, Copy)]
pub struct WallObject {
    pub label: &'static str,
    pub build_cost_factor: i32,
    pub clear_cost_factor: i32,
    pub cost_index: u8,
}

pub const WALL_OBJECTS: &[WallObject] = &[
    WallObject {
        label: "stone wall",
        build_cost_factor: 20,
        clear_cost_factor: 12,
        cost_index: 0,
    },
    WallObject {
        label: "brick wall",
        build_cost_factor: 28,
        clear_cost_factor: 16,
        cost_index: 0,
    },
];

/// An industry type.
#[derive(Debug, Clone, Copy)]
pub struct IndustryObject {
    pub label: &'static str,
    pub build_cost_factor: i32,
    pub clear_cost_factor: i32,
    pub cost_index: u8,
    /// Upper bound (exclusive) for the randomized initial production level.
    pub production_range: u32,
}

pub const INDUSTRY_OBJECTS: &[IndustryObject] = &[
    IndustryObject {
        label: "coal mine",
        build_cost_factor: 12_000,
        clear_cost_factor: 4_000,
        cost_index: 1,
        production_range: 12,
    },
    IndustryObject {
        label: "iron ore mine",
        build_cost_factor: 14_000,
        clear_cost_factor: 4_500,
        cost_index: 1,
        production_range: 10,
    },
    IndustryObject {
        label: "steel mill",
        build_cost_factor: 24_000,
        clear_cost_factor: 8_000,
        cost_index: 1,
        production_range: 8,
    },
    IndustryObject {
        label: "sawmill",
        build_cost_factor: 9_000,
        clear_cost_factor: 3_000,
        cost_index: 1,
        production_range: 14,
    },
];

/// The one headquarters building type.
#[derive(Debug, Clone, Copy)]
pub struct HeadquartersObject {
    pub build_cost_factor: i32,
    pub clear_cost_factor: i32,
    pub cost_index: u8,
}

pub const HEADQUARTERS_OBJECT: HeadquartersObject = HeadquartersObject {
    build_cost_factor: 2_000,
    clear_cost_factor: 600,
    cost_index: 0,
};

/// Per-tile cost factor for raising or lowering land one step.
pub const TERRAFORM_COST_FACTOR: i32 = 180;
/// Cost index used by terraform commands.
pub const TERRAFORM_COST_INDEX: u8 = 4;

/// Names assigned to founded towns; the variant is drawn from the game PRNG.
pub const TOWN_NAMES: &[&str] = &[
    "Drumnadrochit",
    "Sterling Falls",
    "Coalbrook",
    "Ironhaven",
    "Wexford Mills",
    "Granton Junction",
    "Ashfield",
    "Northmoor",
];

pub fn tree(kind: u8) -> Option<&'static TreeObject> {
    TREE_OBJECTS.get(kind as usize)
}

pub fn wall(kind: u8) -> Option<&'static WallObject> {
    WALL_OBJECTS.get(kind as usize)
}

pub fn industry(kind: u8) -> Option<&'static IndustryObject> {
    INDUSTRY_OBJECTS.get(kind as usize)
}
