//! Proptest strategies for primitive states and flux arrays.

use grmhd_core::{Direction, StateVector};
use grmhd_mesh::{CellBounds, GridArray};
use proptest::prelude::*;

/// A physical primitive state: positive density and internal energy,
/// moderate four-velocity and field.
pub fn primitive_state() -> impl Strategy<Value = StateVector> {
    (
        0.1f64..10.0,
        0.01f64..10.0,
        prop::array::uniform3(-2.0f64..2.0),
        prop::array::uniform3(-1.0f64..1.0),
    )
        .prop_map(|(rho, u, vel, field)| StateVector::primitive(rho, u, vel, field))
}

/// Any direction.
pub fn direction() -> impl Strategy<Value = Direction> {
    prop::sample::select(Direction::ALL.to_vec())
}

/// Three flux arrays over `bounds` filled with arbitrary values in
/// `[-1, 1]`, unrelated to any physical state.
pub fn flux_arrays(bounds: CellBounds) -> impl Strategy<Value = [GridArray; 3]> {
    let template = GridArray::zeros(grmhd_core::NPRIM, &bounds);
    let n = template.as_slice().len();
    prop::collection::vec(prop::collection::vec(-1.0f64..1.0, n), 3).prop_map(move |values| {
        let arrays: Vec<GridArray> = values
            .into_iter()
            .map(|v| {
                let mut a = template.clone();
                a.as_mut_slice().copy_from_slice(&v);
                a
            })
            .collect();
        match <[GridArray; 3]>::try_from(arrays) {
            Ok(a) => a,
            Err(_) => unreachable!("three arrays generated"),
        }
    })
}
