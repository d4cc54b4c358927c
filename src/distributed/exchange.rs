//! Non-blocking halo exchange of fields between ranks.
//!
//! Each field has a [`HaloExchangeRequest`] moving through
//! `Idle -> InFlight -> Complete`:
//!
//! - [`launch_halo_exchange`] fills the local (periodic, bounded) halos,
//!   packs the interior slabs next to every communicating edge and posts
//!   them. It returns straight away.
//! - [`complete_halo_communication`] waits for the matching slabs from the
//!   neighbours and unpacks them into the halo. Calling it on a request that
//!   is not in flight does nothing.
//!
//! With both horizontal axes split, `y` slabs carry the `x` halo, so the
//! `y` phase is posted only once the `x` phase has landed. Corner halos then
//! hold the same values as on a single rank.

use tracing::{debug, trace};

use super::Architecture;
use crate::error::CommunicationError;
use crate::field::{Field, IndexBox};
use crate::model::ModelState;
use crate::types::{Axis, Side};

/// Progress of one field's exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ExchangeState {
    #[default]
    Idle,
    InFlight,
    Complete,
}

/// Outstanding transfers of one field.
#[derive(Clone, Debug, Default)]
pub struct HaloExchangeRequest {
    slot: u64,
    state: ExchangeState,
    /// Communicating axes, exchanged in order.
    phases: Vec<Axis>,
    /// Phase whose slabs are currently posted.
    phase: usize,
    /// Values held between launch and completion of an in-process exchange.
    staged: Vec<f64>,
}

impl HaloExchangeRequest {
    /// A request for the field in `slot`. Slots must be unique among the
    /// fields exchanged concurrently.
    pub fn new(slot: usize) -> Self {
        Self {
            slot: slot as u64,
            ..Self::default()
        }
    }

    #[inline]
    pub fn state(&self) -> ExchangeState {
        self.state
    }

    #[inline]
    pub fn slot(&self) -> u64 {
        self.slot
    }

    /// Hold `values` until completion and mark the request in flight.
    pub(crate) fn stage(&mut self, values: Vec<f64>) {
        self.staged = values;
        self.state = ExchangeState::InFlight;
    }

    /// Hand back the staged values and mark the request complete. `None`
    /// unless the request is in flight.
    pub(crate) fn release(&mut self) -> Option<Vec<f64>> {
        if self.state != ExchangeState::InFlight {
            return None;
        }
        self.state = ExchangeState::Complete;
        Some(std::mem::take(&mut self.staged))
    }

    #[inline]
    fn tag(&self, receiver_side: Side) -> u64 {
        self.slot * 4 + receiver_side.index() as u64
    }
}

/// Halo planes along `side` that the neighbour across it fills.
pub fn halo_region(field: &Field, side: Side) -> IndexBox {
    let a = side.axis().index();
    let n = field.size()[a] as isize;
    let h = field.halo()[a] as isize;
    let range = if side.is_high() { n + 1..=n + h + 1 } else { 1 - h..=0 };
    planes(field, side.axis(), range)
}

/// Interior planes sent to the neighbour across `side`: they land in that
/// neighbour's halo on the opposite side.
pub fn send_region(field: &Field, side: Side) -> IndexBox {
    let a = side.axis().index();
    let n = field.size()[a] as isize;
    let h = field.halo()[a] as isize;
    let range = if side.is_high() { n - h + 1..=n } else { 1..=h + 1 };
    planes(field, side.axis(), range)
}

fn planes(field: &Field, axis: Axis, range: std::ops::RangeInclusive<isize>) -> IndexBox {
    let IndexBox { i, j, k } = field.storage();
    let mut r = [i, j, k];
    r[axis.index()] = range;
    let [i, j, k] = r;
    IndexBox::new(i, j, k)
}

fn sides(axis: Axis) -> [Side; 2] {
    match axis {
        Axis::X => [Side::West, Side::East],
        _ => [Side::South, Side::North],
    }
}

fn post(arch: &Architecture, field: &Field, request: &HaloExchangeRequest, axis: Axis) -> Result<(), CommunicationError> {
    for side in sides(axis) {
        let Some(peer) = arch.partition().neighbour(side) else {
            continue;
        };
        let payload = field.pack(&send_region(field, side));
        trace!(rank = arch.rank().get(), %side, peer = peer.get(), slot = request.slot, "posting halo slab");
        arch.communicator().send(peer, request.tag(side.opposite()), payload)?;
    }
    Ok(())
}

fn wait(arch: &Architecture, field: &mut Field, request: &HaloExchangeRequest, axis: Axis) -> Result<(), CommunicationError> {
    for side in sides(axis) {
        let Some(peer) = arch.partition().neighbour(side) else {
            continue;
        };
        let tag = request.tag(side);
        let payload = arch.communicator().recv(peer, tag, arch.halo_timeout())?;
        let region = halo_region(field, side);
        if payload.len() != region.len() {
            return Err(CommunicationError::BufferSizeMismatch {
                tag,
                expected: region.len(),
                actual: payload.len(),
            });
        }
        field.unpack(&region, &payload);
        trace!(rank = arch.rank().get(), %side, peer = peer.get(), slot = request.slot, "unpacked halo slab");
    }
    Ok(())
}

/// Fill local halos and post this field's edge slabs.
///
/// A request already in flight is left alone.
pub fn launch_halo_exchange(
    arch: &Architecture,
    field: &mut Field,
    request: &mut HaloExchangeRequest,
) -> Result<(), CommunicationError> {
    if request.state == ExchangeState::InFlight {
        debug!(slot = request.slot, "halo exchange already in flight");
        return Ok(());
    }
    field.fill_halo_regions();
    let communicating = arch.communicating();
    request.phases = [Axis::X, Axis::Y]
        .into_iter()
        .filter(|a| communicating[a.index()])
        .collect();
    request.phase = 0;
    if let Some(&axis) = request.phases.first() {
        post(arch, field, request, axis)?;
        request.state = ExchangeState::InFlight;
    } else {
        request.state = ExchangeState::Complete;
    }
    Ok(())
}

/// Block until the neighbours' slabs for this field arrive and copy them
/// into its halo. A no-op unless the request is in flight.
pub fn complete_halo_communication(
    arch: &Architecture,
    field: &mut Field,
    request: &mut HaloExchangeRequest,
) -> Result<(), CommunicationError> {
    if request.state != ExchangeState::InFlight {
        return Ok(());
    }
    while request.phase < request.phases.len() {
        let axis = request.phases[request.phase];
        wait(arch, field, request, axis)?;
        request.phase += 1;
        if let Some(&next) = request.phases.get(request.phase) {
            post(arch, field, request, next)?;
        }
    }
    request.state = ExchangeState::Complete;
    Ok(())
}

/// Exchange requests for every prognostic field of a [`ModelState`].
#[derive(Clone, Debug)]
pub struct StateExchange {
    requests: Vec<HaloExchangeRequest>,
}

impl StateExchange {
    pub fn new(state: &ModelState) -> Self {
        Self {
            requests: (0..state.n_prognostic()).map(HaloExchangeRequest::new).collect(),
        }
    }

    pub fn requests(&self) -> &[HaloExchangeRequest] {
        &self.requests
    }

    /// Launch every field's exchange.
    pub fn launch(&mut self, arch: &Architecture, state: &mut ModelState) -> Result<(), CommunicationError> {
        for (field, request) in state.prognostic_mut().zip(self.requests.iter_mut()) {
            launch_halo_exchange(arch, field, request)?;
        }
        Ok(())
    }

    /// Complete every field's exchange.
    pub fn complete(&mut self, arch: &Architecture, state: &mut ModelState) -> Result<(), CommunicationError> {
        for (field, request) in state.prognostic_mut().zip(self.requests.iter_mut()) {
            complete_halo_communication(arch, field, request)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::RectilinearGrid;
    use crate::types::{Loc3, Topology};

    fn local() -> RectilinearGrid {
        RectilinearGrid::uniform(
            [6, 4, 1],
            [2, 2, 0],
            [6.0, 4.0, 1.0],
            [Topology::Connected, Topology::Bounded, Topology::Flat],
        )
        .unwrap()
    }

    #[test]
    fn test_slab_shapes_match_across_the_interface() {
        let g = local();
        let c = Field::new(&g, Loc3::CCC);
        // East halo is filled by what the east neighbour sends west.
        assert_eq!(halo_region(&c, Side::East).len(), send_region(&c, Side::West).len());
        assert_eq!(halo_region(&c, Side::West).len(), send_region(&c, Side::East).len());
        assert_eq!(halo_region(&c, Side::West).i, -1..=0);
        assert_eq!(send_region(&c, Side::East).i, 5..=6);
    }

    #[test]
    fn test_serial_exchange_is_local_fill() {
        let arch = Architecture::serial();
        let g = RectilinearGrid::uniform(
            [6, 4, 1],
            [2, 2, 0],
            [6.0, 4.0, 1.0],
            [Topology::Periodic, Topology::Bounded, Topology::Flat],
        )
        .unwrap();
        let mut c = Field::new(&g, Loc3::CCC);
        c.set_fn(&g, |x, _, _| x);
        let mut request = HaloExchangeRequest::new(0);
        launch_halo_exchange(&arch, &mut c, &mut request).unwrap();
        assert_eq!(request.state(), ExchangeState::Complete);
        complete_halo_communication(&arch, &mut c, &mut request).unwrap();
        assert_eq!(c.get(0, 1, 1), c.get(6, 1, 1));
    }
}
