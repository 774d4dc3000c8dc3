use numpy::ndarray::{Array1, Array2};
use numpy::{IntoPyArray, PyArray1, PyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::RunParameters;
use crate::core::SimulationEngine;

fn py_err<E: ToString>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// BrownSim: Python-facing wrapper around the event-driven engine.
///
/// API:
/// - __new__(box_length=0.5, particle_count=100, ..., output_interval=0.1, seed=None)
/// - simulate(duration)
/// - frame_times() -> np.ndarray, shape (F,)
/// - tracked_trajectory() -> np.ndarray, shape (F, 2)
/// - positions(frame) / velocities(frame) -> np.ndarray, shape (N, 2)
/// - event_times() -> np.ndarray, shape (E,)
/// - collision_frequencies() -> np.ndarray, shape (F - 1,)
#[pyclass]
pub struct BrownSim {
    engine: SimulationEngine,
    params: RunParameters,
}

impl BrownSim {
    fn frame(&self, frame: usize) -> PyResult<&crate::core::BrownSystemState> {
        self.engine.frames().get(frame).ok_or_else(|| {
            py_err(format!(
                "frame {frame} out of range (have {})",
                self.engine.frames().len()
            ))
        })
    }
}

#[pymethods]
impl BrownSim {
    /// Build a square box with one tracked particle and `particle_count` light particles.
    ///
    /// Errors: raises ValueError on invalid parameters.
    #[new]
    #[pyo3(signature = (
        box_length=0.5,
        particle_count=100,
        particle_radius=0.005,
        particle_mass=0.1,
        tracked_radius=0.05,
        tracked_mass=100.0,
        max_speed=0.1,
        output_interval=0.1,
        seed=None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        box_length: f64,
        particle_count: usize,
        particle_radius: f64,
        particle_mass: f64,
        tracked_radius: f64,
        tracked_mass: f64,
        max_speed: f64,
        output_interval: f64,
        seed: Option<u64>,
    ) -> PyResult<Self> {
        let mut params = RunParameters::default();
        params.system.box_length = box_length;
        params.system.particle_count = particle_count;
        params.system.particle_radius = particle_radius;
        params.system.particle_mass = particle_mass;
        params.system.tracked_radius = tracked_radius;
        params.system.tracked_mass = tracked_mass;
        params.system.max_speed = max_speed;
        params.system.seed = seed;
        params.simulation.output_interval = output_interval;
        // duration is given to simulate(); keep validation happy until then
        params.simulation.duration = output_interval;
        let engine = params.build_engine().map_err(py_err)?;
        Ok(Self { engine, params })
    }

    /// Reset and run for `duration` (releases the GIL during computation).
    fn simulate(&mut self, py: Python<'_>, duration: f64) -> PyResult<()> {
        self.params.simulation.duration = duration;
        self.params.validate().map_err(py_err)?;
        py.detach(|| {
            self.engine.initialize()?;
            self.engine.simulate(duration)
        })
        .map_err(py_err)
    }

    /// Number of particles, tracked particle included.
    fn num_particles(&self) -> usize {
        self.engine.system().particles().len()
    }

    /// Snapshot instants, dtype=float64.
    fn frame_times<'py>(&self, py: Python<'py>) -> Py<PyArray1<f64>> {
        let times: Array1<f64> = self.engine.frames().iter().map(|f| f.time).collect();
        times.into_pyarray(py).unbind()
    }

    /// Tracked particle position per frame, shape (F, 2).
    fn tracked_trajectory<'py>(&self, py: Python<'py>) -> Py<PyArray2<f64>> {
        let frames = self.engine.frames();
        let mut arr = Array2::<f64>::zeros((frames.len(), 2));
        for (i, p) in frames.iter().filter_map(|f| f.tracked()).enumerate() {
            arr[[i, 0]] = p.r.x;
            arr[[i, 1]] = p.r.y;
        }
        arr.into_pyarray(py).unbind()
    }

    /// Particle positions in `frame`, shape (N, 2).
    fn positions<'py>(&self, py: Python<'py>, frame: usize) -> PyResult<Py<PyArray2<f64>>> {
        let state = self.frame(frame)?;
        let mut arr = Array2::<f64>::zeros((state.particles.len(), 2));
        for (i, p) in state.particles.iter().enumerate() {
            arr[[i, 0]] = p.r.x;
            arr[[i, 1]] = p.r.y;
        }
        Ok(arr.into_pyarray(py).unbind())
    }

    /// Particle velocities in `frame`, shape (N, 2).
    fn velocities<'py>(&self, py: Python<'py>, frame: usize) -> PyResult<Py<PyArray2<f64>>> {
        let state = self.frame(frame)?;
        let mut arr = Array2::<f64>::zeros((state.particles.len(), 2));
        for (i, p) in state.particles.iter().enumerate() {
            arr[[i, 0]] = p.v.x;
            arr[[i, 1]] = p.v.y;
        }
        Ok(arr.into_pyarray(py).unbind())
    }

    /// Instants of executed collisions.
    fn event_times<'py>(&self, py: Python<'py>) -> Py<PyArray1<f64>> {
        let times: Array1<f64> = self
            .engine
            .processed_events()
            .iter()
            .map(|e| e.time_f64())
            .collect();
        times.into_pyarray(py).unbind()
    }

    /// Collisions per output interval.
    fn collision_frequencies<'py>(&self, py: Python<'py>) -> Py<PyArray1<u64>> {
        let counts: Array1<u64> = self
            .engine
            .collision_frequencies()
            .iter()
            .map(|&c| c as u64)
            .collect();
        counts.into_pyarray(py).unbind()
    }
}

/// The brownsim Python module entry point.
#[pymodule]
fn brownsim(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<BrownSim>()?;
    Ok(())
}
