//! Contracts for the host firmware services that the conversion core depends on

use bincode::{Decode, Encode};

/// Bulk memory transfer engine (the host's DMA unit).
///
/// Transfers are always synchronous from the caller's point of view: when a method returns, the
/// destination holds the transferred data. If `src` and `dst` differ in length, only the shorter
/// length is transferred.
pub trait BulkTransfer {
    /// Copy 32-bit words from `src` into `dst`.
    fn copy_words(&mut self, dst: &mut [u32], src: &[u32]);

    /// Fill `dst` with the 32-bit `value`.
    fn fill_words(&mut self, dst: &mut [u32], value: u32);

    /// Fill `dst` with the 16-bit `value`.
    fn fill_halfwords(&mut self, dst: &mut [u16], value: u16);
}

/// One poll of the host controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
pub struct HostInputState {
    /// Digital button bitmask, one bit per host button (1 = pressed)
    pub buttons: u16,
    /// Horizontal analog axis, signed with 0 at center
    pub axis_h: i8,
    /// Vertical analog axis, signed with 0 at center
    pub axis_v: i8,
}

pub trait HostInput {
    /// Sample the current controller state.
    fn poll(&mut self) -> HostInputState;
}
