//! Region halo exchange with the same request lifecycle as rank exchange.
//!
//! [`launch_region_halo_exchange`] reads every edge value the neighbours
//! provide and stages it on the [`HaloExchangeRequest`], moving it to
//! `InFlight`. Fields may be updated in their interiors in between;
//! [`complete_region_halo_exchange`] writes the staged values into the edge
//! halos, fills the vertical halos and marks the request `Complete`.
//! Completing a request that is not in flight does nothing.
//!
//! `fields` holds one scalar or the `[u, v]` components of a vector.

use tracing::{debug, trace};

use super::connectivity::CubedSphereConnectivity;
use super::fill::{MultiRegionField, plan};
use crate::distributed::{ExchangeState, HaloExchangeRequest};
use crate::error::{CommunicationError, ConfigurationError};

/// Stage the edge values of `fields` on `request`.
///
/// A request already in flight is left alone.
pub fn launch_region_halo_exchange(
    connectivity: &CubedSphereConnectivity,
    fields: &[&MultiRegionField],
    request: &mut HaloExchangeRequest,
) -> Result<(), ConfigurationError> {
    if request.state() == ExchangeState::InFlight {
        debug!(slot = request.slot(), "region halo exchange already in flight");
        return Ok(());
    }
    let transfers = plan(connectivity, fields)?;
    let levels = fields[0].levels();
    let mut values = Vec::with_capacity(transfers.len() * levels.clone().count());
    for t in &transfers {
        let source = &fields[t.source][t.from];
        values.extend(levels.clone().map(|k| t.sign * source.get(t.of.0, t.of.1, k)));
    }
    trace!(slot = request.slot(), values = values.len(), "staged region halo values");
    request.stage(values);
    Ok(())
}

/// Write the staged values of `request` into the halos of `fields`.
pub fn complete_region_halo_exchange(
    connectivity: &CubedSphereConnectivity,
    fields: &mut [&mut MultiRegionField],
    request: &mut HaloExchangeRequest,
) -> crate::Result<()> {
    if request.state() != ExchangeState::InFlight {
        return Ok(());
    }
    let transfers = {
        let shared: Vec<&MultiRegionField> = fields.iter().map(|f| &**f).collect();
        plan(connectivity, &shared)?
    };
    let levels = fields[0].levels();
    let nk = levels.clone().count();
    let values = request.release().unwrap_or_default();
    let expected = transfers.len() * nk;
    if values.len() != expected {
        return Err(CommunicationError::BufferSizeMismatch {
            tag: request.slot(),
            expected,
            actual: values.len(),
        }
        .into());
    }
    if nk > 0 {
        for (t, column) in transfers.iter().zip(values.chunks_exact(nk)) {
            let target = &mut fields[t.target][t.region];
            for (k, &value) in levels.clone().zip(column) {
                target.set(t.at.0, t.at.1, k, value);
            }
        }
    }
    for field in fields.iter_mut() {
        field.fill_vertical();
    }
    trace!(slot = request.slot(), columns = transfers.len(), "completed region halo exchange");
    Ok(())
}
