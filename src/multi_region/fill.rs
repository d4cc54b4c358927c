//! Halo fill across region interfaces.
//!
//! Every interface joins an east or north side to a west or south side, and
//! the face on the interface belongs to the region it opens into (its face
//! `1`). Beyond a side:
//!
//! - a center at depth `d` takes the neighbour's center at depth `d` inside
//!   its touching side
//! - a face `e` steps beyond takes the neighbour's face `e` steps inside, so
//!   the interface face itself (`e = 0`, east and north only) comes from the
//!   neighbour's face `1`
//!
//! The tangential index is reversed when the connection flips. Corner halo
//! points, and tangential faces whose source is not owned by the
//! neighbour, are left untouched.
//!
//! Vector components are local to each region's frame. The component normal
//! to a side is read from the neighbour's component normal to its touching
//! side, with the same sign. The along-edge component is negated when the
//! tangential index flips. A staggered pair (`u` at `FCC`, `v` at `CFC`)
//! therefore swaps roles across edges where the neighbour's axes are turned.

use super::connectivity::CubedSphereConnectivity;
use super::exchange::{complete_region_halo_exchange, launch_region_halo_exchange};
use crate::distributed::HaloExchangeRequest;
use crate::error::ConfigurationError;
use crate::field::Field;
use crate::grid::GridMetrics;
use crate::types::{Axis, Loc3, Location, RegionId, Side, Topology};

/// One field per region, all with the same shape and location.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiRegionField {
    fields: Vec<Field>,
    loc: Loc3,
}

impl MultiRegionField {
    /// Fields at `loc` on square, horizontally connected regions.
    pub fn new(
        grid: &impl GridMetrics,
        connectivity: &CubedSphereConnectivity,
        loc: Loc3,
    ) -> Result<Self, ConfigurationError> {
        let [nx, ny, _] = grid.size();
        if nx != ny {
            return Err(ConfigurationError::Invalid(format!(
                "cubed-sphere regions must be square, got {nx} x {ny}"
            )));
        }
        let [tx, ty, _] = grid.topology();
        if tx != Topology::Connected || ty != Topology::Connected {
            return Err(ConfigurationError::Invalid(format!(
                "region grids need connected horizontal axes, got {tx:?} x {ty:?}"
            )));
        }
        let [hx, hy, _] = grid.halo();
        if hx != hy || hx > nx {
            return Err(ConfigurationError::Invalid(format!(
                "region halos must be equal and at most {nx}, got {hx} and {hy}"
            )));
        }
        Ok(Self {
            fields: (0..connectivity.len()).map(|_| Field::new(grid, loc)).collect(),
            loc,
        })
    }

    /// Cell-centered fields.
    pub fn centered(grid: &impl GridMetrics, connectivity: &CubedSphereConnectivity) -> Result<Self, ConfigurationError> {
        Self::new(grid, connectivity, Loc3::CCC)
    }

    #[inline]
    pub fn loc(&self) -> Loc3 {
        self.loc
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RegionId, &Field)> {
        self.fields.iter().enumerate().map(|(n, f)| (RegionId::new(n), f))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (RegionId, &mut Field)> {
        self.fields.iter_mut().enumerate().map(|(n, f)| (RegionId::new(n), f))
    }

    fn shape(&self) -> Option<([usize; 3], [usize; 3])> {
        self.fields.first().map(|f| (f.size(), f.halo()))
    }

    /// Vertical storage range shared by every region.
    pub(crate) fn levels(&self) -> std::ops::RangeInclusive<isize> {
        self.fields.first().map_or(1..=0, |f| f.storage().k)
    }

    pub(crate) fn fill_vertical(&mut self) {
        for f in &mut self.fields {
            f.fill_halo_along(Axis::Z);
        }
    }
}

impl std::ops::Index<RegionId> for MultiRegionField {
    type Output = Field;

    fn index(&self, id: RegionId) -> &Field {
        &self.fields[id]
    }
}

impl std::ops::IndexMut<RegionId> for MultiRegionField {
    fn index_mut(&mut self, id: RegionId) -> &mut Field {
        &mut self.fields[id]
    }
}

/// Index along the normal of `side` of the point `e` steps inside it.
#[inline]
fn inside(side: Side, loc: Location, n: isize, e: isize) -> isize {
    match (side.is_high(), loc) {
        (false, Location::Center) => e,
        (false, Location::Face) => 1 + e,
        (true, _) => n + 1 - e,
    }
}

/// Index along the normal of `side` of the halo point `e` steps beyond it.
#[inline]
fn beyond(side: Side, loc: Location, n: isize, e: isize) -> isize {
    match (side.is_high(), loc) {
        (false, _) => 1 - e,
        (true, Location::Center) => n + e,
        (true, Location::Face) => n + 1 + e,
    }
}

/// Steps beyond `side` that its neighbour fills.
#[inline]
fn steps(side: Side, loc: Location, h: isize) -> std::ops::RangeInclusive<isize> {
    if side.is_high() && loc.is_face() { 0..=h } else { 1..=h }
}

/// Tangential index on the far side of an interface.
#[inline]
fn along(loc: Location, n: isize, t: isize, flip: bool) -> isize {
    match (flip, loc) {
        (false, _) => t,
        (true, Location::Center) => n + 1 - t,
        (true, Location::Face) => n + 2 - t,
    }
}

/// Horizontal index from normal and tangential indices of `side`.
#[inline]
fn at(side: Side, normal: isize, tangential: isize) -> (isize, isize) {
    match side {
        Side::West | Side::East => (normal, tangential),
        Side::South | Side::North => (tangential, normal),
    }
}

#[inline]
fn tangential_axis(side: Side) -> Axis {
    match side.axis() {
        Axis::X => Axis::Y,
        _ => Axis::X,
    }
}

/// Outward unit vector of `side` in the region's own frame.
#[inline]
fn outward(side: Side) -> (f64, f64) {
    match side {
        Side::West => (-1.0, 0.0),
        Side::East => (1.0, 0.0),
        Side::South => (0.0, -1.0),
        Side::North => (0.0, 1.0),
    }
}

/// Direction of increasing tangential index along `side`.
#[inline]
fn tangent(side: Side) -> (f64, f64) {
    match side {
        Side::West | Side::East => (0.0, 1.0),
        Side::South | Side::North => (1.0, 0.0),
    }
}

/// Rotate a vector across the interface from the neighbour's side `from`
/// to this region's side `to`.
pub fn rotate_across(to: Side, from: Side, flip: bool, (u, v): (f64, f64)) -> (f64, f64) {
    let (oq, tq) = (outward(from), tangent(from));
    let normal = -(u * oq.0 + v * oq.1);
    let along = (u * tq.0 + v * tq.1) * if flip { -1.0 } else { 1.0 };
    let (op, tp) = (outward(to), tangent(to));
    (normal * op.0 + along * tp.0, normal * op.1 + along * tp.1)
}

/// One halo column copied from a neighbouring region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Transfer {
    /// Component written.
    pub target: usize,
    pub region: RegionId,
    pub at: (isize, isize),
    /// Component read.
    pub source: usize,
    pub from: RegionId,
    pub of: (isize, isize),
    pub sign: f64,
}

/// Component of a scalar (one field) or vector pair (two fields) normal to
/// `side`.
#[inline]
fn normal_component(side: Side, count: usize) -> usize {
    if count == 1 || side.axis() == Axis::X { 0 } else { 1 }
}

fn check_locations(fields: &[&MultiRegionField]) -> Result<(), ConfigurationError> {
    use Location::{Center, Face};
    let symmetric = |l: Loc3| l.x == l.y;
    match fields {
        [c] if symmetric(c.loc) => Ok(()),
        [c] => Err(ConfigurationError::Invalid(format!(
            "a scalar exchanged across turned region edges needs the same x and y location, got {:?}",
            c.loc
        ))),
        [u, v] if u.loc == v.loc && symmetric(u.loc) => Ok(()),
        [u, v] if (u.loc.x, u.loc.y, v.loc.x, v.loc.y) == (Face, Center, Center, Face) && u.loc.z == v.loc.z => Ok(()),
        [u, v] => Err(ConfigurationError::Invalid(format!(
            "vector components must be co-located or at FCC and CFC, got {:?} and {:?}",
            u.loc, v.loc
        ))),
        _ => Err(ConfigurationError::Invalid(format!(
            "region halo exchange takes one scalar or two vector components, got {} fields",
            fields.len()
        ))),
    }
}

/// Every edge halo column of `fields`, in a fixed order.
pub(crate) fn plan(
    connectivity: &CubedSphereConnectivity,
    fields: &[&MultiRegionField],
) -> Result<Vec<Transfer>, ConfigurationError> {
    check_locations(fields)?;
    let shape = fields[0].shape();
    if fields
        .iter()
        .any(|f| f.len() != connectivity.len() || f.shape() != shape)
    {
        return Err(ConfigurationError::Invalid(format!(
            "region fields must all hold {} regions of the same shape",
            connectivity.len()
        )));
    }
    let Some(([n, _, _], [h, _, _])) = shape else {
        return Ok(Vec::new());
    };
    let (n, h) = (n as isize, h as isize);
    let count = fields.len();

    let mut transfers = Vec::new();
    for region in connectivity.regions() {
        for (side, c) in region.neighbours.iter() {
            if side.is_high() == c.side.is_high() {
                return Err(ConfigurationError::Invalid(format!(
                    "{} {side} meets the {} side of {}: interface face ownership is ambiguous",
                    region.id, c.side, c.region
                )));
            }
            let normal = normal_component(side, count);
            let across = normal_component(c.side, count);
            // A high side meets a low side, so the normal component keeps
            // its sign; only the along-edge component follows the flip.
            let mut roles = vec![(normal, across, 1.0)];
            if count == 2 {
                let sign = if c.flip { -1.0 } else { 1.0 };
                roles.push((1 - normal, 1 - across, sign));
            }
            for (target, source, sign) in roles {
                let loc = fields[target].loc;
                let ln = loc.along(side.axis());
                let lt = loc.along(tangential_axis(side));
                let tangential = if lt.is_face() { 1..=n + 1 } else { 1..=n };
                for e in steps(side, ln, h) {
                    let ns = inside(c.side, ln, n, e);
                    if !(1..=n).contains(&ns) {
                        continue;
                    }
                    for t in tangential.clone() {
                        let ts = along(lt, n, t, c.flip);
                        if !(1..=n).contains(&ts) {
                            continue;
                        }
                        transfers.push(Transfer {
                            target,
                            region: region.id,
                            at: at(side, beyond(side, ln, n, e), t),
                            source,
                            from: c.region,
                            of: at(c.side, ns, ts),
                            sign,
                        });
                    }
                }
            }
        }
    }
    Ok(transfers)
}

/// Fill the edge halos of a scalar field from neighbouring regions.
///
/// The field's `x` and `y` locations must match (`CCC`, `FFC`, ...).
///
/// # Example
///
/// ```
/// use fv_ocean::grid::RectilinearGrid;
/// use fv_ocean::multi_region::{CubedSphereConnectivity, MultiRegionField, fill_halo_regions};
/// use fv_ocean::types::{RegionId, Side, Topology};
///
/// let cube = CubedSphereConnectivity::new(1)?;
/// let grid = RectilinearGrid::uniform(
///     [4, 4, 1],
///     [2, 2, 0],
///     [1.0, 1.0, 1.0],
///     [Topology::Connected, Topology::Connected, Topology::Flat],
/// )?;
/// let mut c = MultiRegionField::centered(&grid, &cube)?;
/// for (id, field) in c.iter_mut() {
///     field.fill(id.get() as f64);
/// }
/// fill_halo_regions(&cube, &mut c)?;
/// let east = cube.connection(RegionId::new(0), Side::East).region;
/// assert_eq!(c[RegionId::new(0)].get(5, 2, 1), east.get() as f64);
/// // Corners are not filled.
/// assert_eq!(c[RegionId::new(0)].get(5, 5, 1), 0.0);
/// # Ok::<(), fv_ocean::Error>(())
/// ```
pub fn fill_halo_regions(connectivity: &CubedSphereConnectivity, field: &mut MultiRegionField) -> crate::Result<()> {
    let mut request = HaloExchangeRequest::new(0);
    launch_region_halo_exchange(connectivity, &[&*field], &mut request)?;
    complete_region_halo_exchange(connectivity, &mut [field], &mut request)
}

/// Fill the edge halos of a pair of frame-relative vector components,
/// either co-located or staggered at `FCC` and `CFC`.
pub fn fill_vector_halo_regions(
    connectivity: &CubedSphereConnectivity,
    u: &mut MultiRegionField,
    v: &mut MultiRegionField,
) -> crate::Result<()> {
    let mut request = HaloExchangeRequest::new(0);
    launch_region_halo_exchange(connectivity, &[&*u, &*v], &mut request)?;
    complete_region_halo_exchange(connectivity, &mut [u, v], &mut request)
}
