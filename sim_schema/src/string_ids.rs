//! Localizable string identifiers used by the command error channel.
//!
//! The engine only ever hands indices across the presentation boundary; the
//! English fallback table here exists for test assertions and harness
//! output.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Index into the localizable string table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StringId(pub u16);

impl fmt::Display for StringId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", lookup(*self))
    }
}

pub const EMPTY: StringId = StringId(0);
pub const CANNOT_PERFORM_ACTION: StringId = StringId(1);
pub const NOT_ENOUGH_CASH: StringId = StringId(2);
pub const COMPANY_IS_BANKRUPT: StringId = StringId(3);
pub const BANK_REFUSES_TO_LEND: StringId = StringId(4);
pub const TOO_CLOSE_TO_EDGE_OF_MAP: StringId = StringId(5);
pub const ALREADY_SOMETHING_HERE: StringId = StringId(6);
pub const NOTHING_TO_REMOVE_HERE: StringId = StringId(7);
pub const BELONGS_TO_ANOTHER_COMPANY: StringId = StringId(8);
pub const INVALID_NAME: StringId = StringId(9);
pub const NAME_ALREADY_IN_USE: StringId = StringId(10);
pub const TOWN_NOT_FOUND: StringId = StringId(11);
pub const INDUSTRY_NOT_FOUND: StringId = StringId(12);
pub const STATION_NOT_FOUND: StringId = StringId(13);
pub const COMPANY_NOT_FOUND: StringId = StringId(14);
pub const TOO_MANY_INDUSTRIES: StringId = StringId(15);
pub const TOO_MANY_TOWNS: StringId = StringId(16);
pub const TOO_CLOSE_TO_ANOTHER_TOWN: StringId = StringId(17);
pub const LAND_AT_MAXIMUM_HEIGHT: StringId = StringId(18);
pub const LAND_AT_MINIMUM_HEIGHT: StringId = StringId(19);
pub const UNSUITABLE_OBJECT_TYPE: StringId = StringId(20);
pub const COMPANY_HAS_NO_HEADQUARTERS: StringId = StringId(21);
pub const ERROR_CANT_RENAME: StringId = StringId(22);
pub const ERROR_CANT_CHANGE_LOAN: StringId = StringId(23);
pub const ERROR_CANT_BUILD_THIS_HERE: StringId = StringId(24);
pub const ERROR_CANT_REMOVE_THIS: StringId = StringId(25);
pub const ERROR_CANT_FOUND_TOWN: StringId = StringId(26);
pub const ERROR_CANT_FOUND_INDUSTRY: StringId = StringId(27);
pub const GAME_IS_PAUSED: StringId = StringId(28);

/// English fallback text.
pub fn lookup(id: StringId) -> &'static str {
    match id {
        EMPTY => "",
        CANNOT_PERFORM_ACTION => "cannot perform this action",
        NOT_ENOUGH_CASH => "not enough cash",
        COMPANY_IS_BANKRUPT => "company is bankrupt",
        BANK_REFUSES_TO_LEND => "the bank refuses to lend any more money",
        TOO_CLOSE_TO_EDGE_OF_MAP => "too close to edge of map",
        ALREADY_SOMETHING_HERE => "already something here",
        NOTHING_TO_REMOVE_HERE => "nothing to remove here",
        BELONGS_TO_ANOTHER_COMPANY => "belongs to another company",
        INVALID_NAME => "invalid name",
        NAME_ALREADY_IN_USE => "name already in use",
        TOWN_NOT_FOUND => "town not found",
        INDUSTRY_NOT_FOUND => "industry not found",
        STATION_NOT_FOUND => "station not found",
        COMPANY_NOT_FOUND => "company not found",
        TOO_MANY_INDUSTRIES => "too many industries",
        TOO_MANY_TOWNS => "too many towns",
        TOO_CLOSE_TO_ANOTHER_TOWN => "too close to another town",
        LAND_AT_MAXIMUM_HEIGHT => "land at maximum height",
        LAND_AT_MINIMUM_HEIGHT => "land at minimum height",
        UNSUITABLE_OBJECT_TYPE => "unsuitable object type",
        COMPANY_HAS_NO_HEADQUARTERS => "company has no headquarters",
        ERROR_CANT_RENAME => "can't rename this",
        ERROR_CANT_CHANGE_LOAN => "can't change loan size",
        ERROR_CANT_BUILD_THIS_HERE => "can't build this here",
        ERROR_CANT_REMOVE_THIS => "can't remove this",
        ERROR_CANT_FOUND_TOWN => "can't found town here",
        ERROR_CANT_FOUND_INDUSTRY => "can't found industry here",
        GAME_IS_PAUSED => "game is paused",
        StringId(_) => "(unknown string)",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_have_text() {
        assert_eq!(lookup(CANNOT_PERFORM_ACTION), "cannot perform this action");
        assert_eq!(lookup(EMPTY), "");
        assert_eq!(lookup(StringId(9999)), "(unknown string)");
    }
}
