#![warn(missing_docs)]
//! The CRL transfocator simulator.
//!
//! The [`CrlSimulator`] composes the transfer matrix of a set of engaged cartridges, propagates the marginal ray of
//! a point source through it and derives the real focus of the lens system. If all engaged lenses share the same
//! radius, the focus of the corresponding ideal (thin) CRL is calculated as well (see [`compute_ideal_focus`]).
//! Both are finally compared against the nominal focus position of the beamline (defocus).
use std::{collections::HashSet, f64::consts::PI};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use uom::si::{
    angle::radian,
    f64::{Angle, Length},
    length::meter,
};

use crate::{
    beamline::{BeamlineConfig, TransfocatorGeometry},
    catalog::{LensCatalog, LensType},
    error::{CrlError, CrlResult},
    ideal_focus::compute_ideal_focus,
    matrix::{BackendType, Matrix, MatrixBackend},
    optics::{drift, lens_array, Ray},
    utils::math_utils::mean,
};

/// Result of a single simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// image distance `p1` behind the last lens of the real lens system
    pub real_focus_distance: Length,
    /// focal length of the composite lens system
    pub composite_focal_length: Length,
    /// distance between the nominal and the real focus
    pub defocus_real: Length,
    /// focal length of the equivalent ideal lens
    pub ideal_focus: Option<Length>,
    /// image distance behind the equivalent ideal lens
    pub ideal_focus_distance: Option<Length>,
    /// image distance of the equivalent ideal lens measured from the source
    pub ideal_focus_from_source: Option<Length>,
    /// distance between the nominal and the ideal focus
    pub defocus_ideal: Option<Length>,
    /// reason why the ideal lens could not be calculated
    pub ideal_focus_message: Option<String>,
}
impl SimulationResult {
    /// Result of a simulation without any lenses in the beam. All distances are zero.
    #[must_use]
    pub fn without_lenses() -> Self {
        let zero = Length::new::<meter>(0.0);
        Self {
            real_focus_distance: zero,
            composite_focal_length: zero,
            defocus_real: zero,
            ideal_focus: Some(zero),
            ideal_focus_distance: Some(zero),
            ideal_focus_from_source: Some(zero),
            defocus_ideal: Some(zero),
            ideal_focus_message: None,
        }
    }
}

/// Lenses engaged by a set of cartridges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertedLenses {
    /// cartridge ids in beam order
    pub ids: Vec<String>,
    /// lens radius of each cartridge
    pub radii: Vec<Length>,
    /// total number of lenses
    pub total_lenses: u32,
}

/// Simulator of the transfocator of a beamline.
#[derive(Debug, Clone)]
pub struct CrlSimulator {
    beamline: BeamlineConfig,
    geometry: TransfocatorGeometry,
    catalog: LensCatalog,
    backend: BackendType,
}
impl CrlSimulator {
    /// Creates a new [`CrlSimulator`].
    ///
    /// The lens catalog is built from the given radii (µm) and lens counts.
    ///
    /// # Errors
    ///
    /// This function will return an [`CrlError::Config`] if the lens catalog cannot be built (see
    /// [`LensCatalog::build`]).
    pub fn new(
        beamline: BeamlineConfig,
        geometry: TransfocatorGeometry,
        r_array: &[f64],
        lens_array: &[u32],
        backend: BackendType,
    ) -> CrlResult<Self> {
        let catalog = LensCatalog::build(r_array, lens_array)?;
        Ok(Self {
            beamline,
            geometry,
            catalog,
            backend,
        })
    }
    /// Returns a reference to the beamline of this [`CrlSimulator`].
    #[must_use]
    pub const fn beamline(&self) -> &BeamlineConfig {
        &self.beamline
    }
    /// Returns a reference to the geometry of this [`CrlSimulator`].
    #[must_use]
    pub const fn geometry(&self) -> &TransfocatorGeometry {
        &self.geometry
    }
    /// Returns a reference to the lens catalog of this [`CrlSimulator`].
    #[must_use]
    pub const fn catalog(&self) -> &LensCatalog {
        &self.catalog
    }
    /// Returns the matrix backend used by this [`CrlSimulator`].
    #[must_use]
    pub const fn backend(&self) -> BackendType {
        self.backend
    }
    /// Simulate the transfocator with the given cartridges engaged.
    ///
    /// `p0` is the distance of the source to the first engaged lens, `teta0` the divergence of the source and
    /// `delta` the index of refraction decrement of the lens material at the photon energy of interest.
    ///
    /// Without any cartridges engaged, the result is [`SimulationResult::without_lenses`]. If the engaged lenses
    /// have different radii, the ideal lens is not calculated and the reason is stored in
    /// [`SimulationResult::ideal_focus_message`].
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - a cartridge id is unknown ([`CrlError::UnknownCartridge`])
    ///   - a cartridge id is given more than once ([`CrlError::DuplicateCartridge`])
    ///   - the lens type of a cartridge is not part of the catalog ([`CrlError::Config`])
    ///   - `delta` is zero ([`CrlError::InvalidOpticalParameter`])
    ///   - the ideal lens images the source to infinity ([`CrlError::DivisionByZero`])
    pub fn simulate(
        &self,
        cart_ids: &[String],
        p0: Length,
        teta0: Angle,
        delta: f64,
    ) -> CrlResult<SimulationResult> {
        if cart_ids.is_empty() {
            return Ok(SimulationResult::without_lenses());
        }
        let lenses = self.validate(cart_ids)?;
        let backend = self.backend.backend();
        let transfer = self.compose(backend.as_ref(), cart_ids, &lenses, delta)?;
        debug!("composite transfer matrix: {transfer}");
        let p0 = p0.get::<meter>();
        let ray = Ray::from_source(p0, teta0.get::<radian>()).propagate(backend.as_ref(), &transfer)?;
        let p1 = ray.y / (PI - ray.theta).tan();
        let f = 1.0 / (1.0 / p0 + 1.0 / p1);

        let radii: Vec<f64> = lenses.iter().map(LensType::radius_in_meter).collect();
        let total_lenses: u32 = lenses.iter().map(|lens| lens.lens_count).sum();
        let (ideal, ideal_focus_message) = if self.has_uniform_radii(&radii) {
            let ideal = compute_ideal_focus(
                Length::new::<meter>(radii[0]),
                i64::from(total_lenses),
                delta,
                Length::new::<meter>(p0),
            )?;
            (Some(ideal), None)
        } else {
            let message = format!(
                "Radii of the specified lenses ({radii:?}) are different! Cannot calculate ideal lens."
            );
            warn!("{message}");
            (None, Some(message))
        };
        let last_id = &cart_ids[cart_ids.len() - 1];
        let alignment_offset = self
            .beamline
            .cartridge_position(last_id, &self.geometry)?;
        let d_ssa_focus = self.geometry.d_ssa_focus.get::<meter>();
        let defocus = |p1: f64| Length::new::<meter>(d_ssa_focus - (p0 + p1 + alignment_offset));

        Ok(SimulationResult {
            real_focus_distance: Length::new::<meter>(p1),
            composite_focal_length: Length::new::<meter>(f),
            defocus_real: defocus(p1),
            ideal_focus: ideal.map(|i| i.ideal_focus),
            ideal_focus_distance: ideal.map(|i| i.p1_ideal),
            ideal_focus_from_source: ideal.map(|i| i.p1_ideal_from_source),
            defocus_ideal: ideal.map(|i| defocus(i.p1_ideal.get::<meter>())),
            ideal_focus_message,
        })
    }
    /// Returns the ids, radii and total lens count of the given cartridges.
    ///
    /// # Errors
    ///
    /// This function will return an error if a cartridge id is unknown or its lens type is not part of the
    /// catalog.
    pub fn get_inserted_lenses(&self, cart_ids: &[String]) -> CrlResult<InsertedLenses> {
        let lenses = cart_ids
            .iter()
            .map(|id| self.lens_type(id))
            .collect::<CrlResult<Vec<_>>>()?;
        Ok(InsertedLenses {
            ids: cart_ids.to_vec(),
            radii: lenses.iter().map(|lens| lens.radius).collect(),
            total_lenses: lenses.iter().map(|lens| lens.lens_count).sum(),
        })
    }
    fn validate(&self, cart_ids: &[String]) -> CrlResult<Vec<LensType>> {
        for id in cart_ids {
            if self.beamline.find_element_by_id(id).is_none() {
                return Err(CrlError::UnknownCartridge(format!(
                    "specified cart_id <{id}> not in the list of available ids: <{}>",
                    self.beamline.available_ids().join(", ")
                )));
            }
        }
        let unique: HashSet<&String> = cart_ids.iter().collect();
        if unique.len() != cart_ids.len() {
            return Err(CrlError::DuplicateCartridge(format!(
                "number of non-unique cartridge ids: {}",
                cart_ids.len() - unique.len() + 1
            )));
        }
        cart_ids.iter().map(|id| self.lens_type(id)).collect()
    }
    fn lens_type(&self, id: &str) -> CrlResult<LensType> {
        let cartridge = self.beamline.cartridge(id).ok_or_else(|| {
            CrlError::UnknownCartridge(format!(
                "specified cart_id <{id}> not in the list of available ids: <{}>",
                self.beamline.available_ids().join(", ")
            ))
        })?;
        self.catalog.get(&cartridge.name).copied().ok_or_else(|| {
            CrlError::Config(format!(
                "lens type <{}> of cartridge <{id}> is not available",
                cartridge.name
            ))
        })
    }
    /// Transfer matrix of all engaged cartridges with the most downstream element leftmost.
    fn compose(
        &self,
        backend: &dyn MatrixBackend,
        cart_ids: &[String],
        lenses: &[LensType],
        delta: f64,
    ) -> CrlResult<Matrix> {
        let dl_lens = self.geometry.dl_lens.get::<meter>();
        let cartridge_matrix = |lens: &LensType| {
            lens_array(
                backend,
                lens.radius_in_meter(),
                lens.lens_count,
                delta,
                dl_lens,
            )
        };
        let mut transfer = cartridge_matrix(&lenses[0])?;
        for (ids, lens) in cart_ids.windows(2).zip(lenses.iter().skip(1)) {
            let gap =
                self.beamline
                    .distance_between(&ids[0], &ids[1], &self.catalog, &self.geometry)?;
            transfer = backend.dot(&drift(gap), &transfer)?;
            transfer = backend.dot(&cartridge_matrix(lens)?, &transfer)?;
        }
        Ok(transfer)
    }
    /// The mean radius is compared against the first radius.
    fn has_uniform_radii(&self, radii: &[f64]) -> bool {
        mean(radii).is_some_and(|mean_radius| {
            (mean_radius - radii[0]).abs() < self.geometry.radii_tolerance.get::<meter>()
        })
    }
}
