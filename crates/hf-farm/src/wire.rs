//! Flat `f64` encodings of the broadcast setup and of result packets.
//!
//! Setup layout: `qIC[4] wIC[4] N t[N+1] S[16] L l1 l2 l3 l4 Af At Cd Tc xtest`,
//! with `S` stored column-major.

use crate::error::ProtocolViolation;
use hf_core::ensure_all_finite;
use hf_modal::{InitialCondition, ModalError, ModelSetup, TimeGrid, WaveSpeeds};
use nalgebra::{Matrix4, Vector4};

/// Scalars per result packet: three 4-vectors and the task index.
pub const RESULT_LEN: usize = 13;

/// Fixed part of the setup payload (everything but the instants).
const SETUP_FIXED_LEN: usize = 4 + 4 + 1 + 16 + 10;

/// Setup payload length for a grid with `n_steps` steps.
pub fn setup_len(n_steps: usize) -> usize {
    SETUP_FIXED_LEN + n_steps + 1
}

pub fn encode_setup(setup: &ModelSetup) -> Vec<f64> {
    let mut out = Vec::with_capacity(setup_len(setup.grid.n_steps()));
    out.extend_from_slice(setup.initial.q.as_slice());
    out.extend_from_slice(setup.initial.w.as_slice());
    out.push(setup.grid.n_steps() as f64);
    out.extend_from_slice(setup.grid.instants());
    out.extend_from_slice(setup.s.as_slice());
    out.push(setup.length);
    out.extend_from_slice(&setup.speeds.signed());
    out.extend_from_slice(&[
        setup.area_fluid,
        setup.area_wall,
        setup.discharge_coefficient,
        setup.closure_time,
        setup.probe_x,
    ]);
    out
}

fn malformed(what: impl Into<String>) -> ProtocolViolation {
    ProtocolViolation::MalformedSetup { what: what.into() }
}

impl From<ModalError> for ProtocolViolation {
    fn from(err: ModalError) -> Self {
        malformed(err.to_string())
    }
}

pub fn decode_setup(payload: &[f64]) -> Result<ModelSetup, ProtocolViolation> {
    let n = *payload
        .get(8)
        .ok_or_else(|| malformed(format!("payload of {} values is too short", payload.len())))?;
    if !(n.is_finite() && n >= 0.0 && n.fract() == 0.0) {
        return Err(malformed(format!("step count {n} is not a non-negative integer")));
    }
    if n >= payload.len() as f64 {
        return Err(malformed(format!(
            "step count {n} exceeds payload of {} values",
            payload.len()
        )));
    }
    let n = n as usize;
    let expected = setup_len(n);
    if payload.len() != expected {
        return Err(malformed(format!(
            "expected {expected} values for N = {n}, got {}",
            payload.len()
        )));
    }
    ensure_all_finite(payload, "setup payload").map_err(|e| malformed(e.to_string()))?;

    let (q, rest) = payload.split_at(4);
    let (w, rest) = rest.split_at(4);
    let (instants, rest) = rest[1..].split_at(n + 1);
    let (s, tail) = rest.split_at(16);

    let setup = ModelSetup {
        initial: InitialCondition::from_parts(
            Vector4::from_column_slice(q),
            Vector4::from_column_slice(w),
        ),
        grid: TimeGrid::from_instants(instants.to_vec())?,
        s: Matrix4::from_column_slice(s),
        length: tail[0],
        speeds: WaveSpeeds::from_signed([tail[1], tail[2], tail[3], tail[4]])?,
        area_fluid: tail[5],
        area_wall: tail[6],
        discharge_coefficient: tail[7],
        closure_time: tail[8],
        probe_x: tail[9],
    };
    setup.validate()?;
    Ok(setup)
}

/// States at the three stations for one time index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultPacket {
    pub index: usize,
    pub upstream: Vector4<f64>,
    pub downstream: Vector4<f64>,
    pub probe: Vector4<f64>,
}

impl ResultPacket {
    pub fn to_payload(&self) -> [f64; RESULT_LEN] {
        let mut out = [0.0; RESULT_LEN];
        out[0..4].copy_from_slice(self.upstream.as_slice());
        out[4..8].copy_from_slice(self.downstream.as_slice());
        out[8..12].copy_from_slice(self.probe.as_slice());
        out[12] = self.index as f64;
        out
    }

    pub fn from_payload(payload: &[f64; RESULT_LEN]) -> Result<Self, ProtocolViolation> {
        let raw = payload[12];
        if !(raw.is_finite() && raw >= 0.0 && raw.fract() == 0.0 && raw <= usize::MAX as f64) {
            return Err(ProtocolViolation::MalformedIndex { value: raw });
        }
        Ok(Self {
            index: raw as usize,
            upstream: Vector4::from_column_slice(&payload[0..4]),
            downstream: Vector4::from_column_slice(&payload[4..8]),
            probe: Vector4::from_column_slice(&payload[8..12]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hf_modal::{ModalModel, ModelParameters};

    fn delft_setup(n: usize) -> ModelSetup {
        let model = ModalModel::derive(&ModelParameters::delft()).unwrap();
        let grid = TimeGrid::new(n as f64 * 0.002, 0.002).unwrap();
        ModelSetup::new(&model, grid, 11.15).unwrap()
    }

    #[test]
    fn setup_survives_broadcast() {
        let setup = delft_setup(7);
        let payload = encode_setup(&setup);
        assert_eq!(payload.len(), 4 + 4 + 1 + 8 + 16 + 10);
        assert_eq!(payload[8], 7.0);
        assert_eq!(decode_setup(&payload).unwrap(), setup);
    }

    #[test]
    fn s_is_column_major() {
        let setup = delft_setup(2);
        let payload = encode_setup(&setup);
        let s_start = 4 + 4 + 1 + 3;
        assert_eq!(payload[s_start], setup.s[(0, 0)]);
        assert_eq!(payload[s_start + 1], setup.s[(1, 0)]);
        assert_eq!(payload[s_start + 4], setup.s[(0, 1)]);
    }

    #[test]
    fn rejects_truncated_payload() {
        let payload = encode_setup(&delft_setup(3));
        let err = decode_setup(&payload[..payload.len() - 1]).unwrap_err();
        assert!(matches!(err, ProtocolViolation::MalformedSetup { .. }));
        assert!(decode_setup(&payload[..5]).is_err());
    }

    #[test]
    fn rejects_fractional_step_count() {
        let mut payload = encode_setup(&delft_setup(3));
        payload[8] = 2.5;
        assert!(decode_setup(&payload).is_err());
    }

    #[test]
    fn rejects_unpaired_wave_speeds() {
        let setup = delft_setup(3);
        let mut payload = encode_setup(&setup);
        let l2 = payload.len() - 10 + 2;
        payload[l2] = -payload[l2] * 1.5;
        assert!(decode_setup(&payload).is_err());
    }

    #[test]
    fn packet_index_must_be_integral() {
        let packet = ResultPacket {
            index: 4,
            upstream: Vector4::new(1.0, 2.0, 3.0, 4.0),
            downstream: Vector4::repeat(5.0),
            probe: Vector4::repeat(6.0),
        };
        let mut payload = packet.to_payload();
        assert_eq!(ResultPacket::from_payload(&payload).unwrap(), packet);

        payload[12] = 1.5;
        assert!(matches!(
            ResultPacket::from_payload(&payload),
            Err(ProtocolViolation::MalformedIndex { .. })
        ));
        payload[12] = -1.0;
        assert!(ResultPacket::from_payload(&payload).is_err());
        payload[12] = f64::NAN;
        assert!(ResultPacket::from_payload(&payload).is_err());
    }
}
