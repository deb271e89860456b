//! Column-wise assembly of worker results into time series.

use crate::error::{FarmResult, ProtocolViolation};
use crate::wire::ResultPacket;
use hf_modal::ModelSetup;
use nalgebra::{Matrix4, Matrix4xX, Vector4};

/// One `4 x (N+1)` matrix per station, columns indexed by time sample.
#[derive(Debug, Clone, PartialEq)]
pub struct StationSeries {
    pub upstream: Matrix4xX<f64>,
    pub downstream: Matrix4xX<f64>,
    pub probe: Matrix4xX<f64>,
}

impl StationSeries {
    fn zeros(columns: usize) -> Self {
        Self {
            upstream: Matrix4xX::zeros(columns),
            downstream: Matrix4xX::zeros(columns),
            probe: Matrix4xX::zeros(columns),
        }
    }

    fn set(
        &mut self,
        index: usize,
        upstream: &Vector4<f64>,
        downstream: &Vector4<f64>,
        probe: &Vector4<f64>,
    ) {
        self.upstream.set_column(index, upstream);
        self.downstream.set_column(index, downstream);
        self.probe.set_column(index, probe);
    }
}

/// Completed run output: modal states and their physical images.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub instants: Vec<f64>,
    pub modal: StationSeries,
    pub physical: StationSeries,
}

#[derive(Debug, Clone)]
pub struct ResultAssembler {
    s: Matrix4<f64>,
    instants: Vec<f64>,
    filled: Vec<bool>,
    remaining: usize,
    modal: StationSeries,
    physical: StationSeries,
}

impl ResultAssembler {
    pub fn new(setup: &ModelSetup) -> Self {
        let columns = setup.task_count();
        Self {
            s: setup.s,
            instants: setup.grid.instants().to_vec(),
            filled: vec![false; columns],
            remaining: columns,
            modal: StationSeries::zeros(columns),
            physical: StationSeries::zeros(columns),
        }
    }

    pub fn is_filled(&self, index: usize) -> bool {
        self.filled.get(index).copied().unwrap_or(false)
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }

    pub fn insert(&mut self, packet: &ResultPacket) -> Result<(), ProtocolViolation> {
        let index = packet.index;
        let count = self.filled.len();
        let slot = self
            .filled
            .get_mut(index)
            .ok_or(ProtocolViolation::TaskOutOfRange { index, count })?;
        if *slot {
            return Err(ProtocolViolation::DuplicateResult { index });
        }
        *slot = true;
        self.remaining -= 1;

        self.modal
            .set(index, &packet.upstream, &packet.downstream, &packet.probe);
        self.physical.set(
            index,
            &(self.s * packet.upstream),
            &(self.s * packet.downstream),
            &(self.s * packet.probe),
        );
        Ok(())
    }

    pub fn finish(self) -> FarmResult<TimeSeries> {
        if self.remaining > 0 {
            return Err(ProtocolViolation::IncompleteResults {
                missing: self.remaining,
            }
            .into());
        }
        Ok(TimeSeries {
            instants: self.instants,
            modal: self.modal,
            physical: self.physical,
        })
    }
}
