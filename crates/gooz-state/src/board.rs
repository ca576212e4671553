//! Mapping from the server's board enumeration to the rendered board.
//!
//! The server walks a 20-square loop; the rendered board has 15 cells, so
//! several server squares share a cell.

/// Squares in the server's enumeration.
pub const SERVER_POSITIONS: u32 = 20;

/// Cells on the rendered board.
pub const BOARD_CELLS: u32 = 15;

/// Index = server position, value = board cell.
#[rustfmt::skip]
const POSITION_MAPPING: [u32; SERVER_POSITIONS as usize] = [
    0,              // GO
    1, 2, 3, 4,
    11,             // jail
    12, 13, 14, 5,
    4,              // free parking
    6, 7, 8, 9,
    12,             // go to jail
    10, 9, 8, 7,
];

/// Returns the board cell for a server position, or `None` if the server
/// reported a position outside its own enumeration.
///
/// ```rust
/// use gooz_state::board_position;
///
/// assert_eq!(board_position(5), Some(11));
/// assert_eq!(board_position(20), None);
/// ```
pub fn board_position(server: u32) -> Option<u32> {
    POSITION_MAPPING.get(server as usize).copied()
}
