//! Runtime V2 primitive payloads.

use serde_json::{Value, json};

use qrun_hal::{
    Counts, EstimatorOptions, EstimatorPub, EstimatorPubResult, SamplerOptions, SamplerPub,
    SamplerPubResult,
};
use qrun_ir::Observable;
use qrun_qasm3::emit;

use crate::api::{JobResultResponse, PubResultResponse};
use crate::error::{IbmError, IbmResult};

/// Classical register a sampler pub reads back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterShape {
    /// Register name in the emitted program.
    pub name: String,
    /// Number of bits.
    pub num_bits: usize,
}

/// `{"ZZ": 1.0}` for one observable.
fn observable_json(obs: &Observable) -> Value {
    let mut term = serde_json::Map::new();
    term.insert(obs.label(), json!(obs.coeff()));
    Value::Object(term)
}

/// Estimator V2 params: `pubs = [[qasm, [obs, ...]], ...]`.
pub fn estimator_params(pubs: &[EstimatorPub], options: &EstimatorOptions) -> IbmResult<Value> {
    let pubs = pubs
        .iter()
        .map(|p| -> IbmResult<Value> {
            let observables: Vec<Value> = p.observables.iter().map(observable_json).collect();
            Ok(json!([emit(&p.circuit)?, observables]))
        })
        .collect::<IbmResult<Vec<_>>>()?;
    Ok(json!({
        "version": 2,
        "pubs": pubs,
        "resilience_level": options.resilience_level,
        "options": { "default_shots": options.default_shots },
    }))
}

/// Sampler V2 params: `pubs = [[qasm, {}, shots], ...]`.
pub fn sampler_params(pubs: &[SamplerPub], options: &SamplerOptions) -> IbmResult<Value> {
    let pubs = pubs
        .iter()
        .map(|p| -> IbmResult<Value> {
            let shots = p.shots.unwrap_or(options.default_shots);
            Ok(json!([emit(&p.circuit)?, {}, shots]))
        })
        .collect::<IbmResult<Vec<_>>>()?;
    Ok(json!({
        "version": 2,
        "pubs": pubs,
        "options": { "default_shots": options.default_shots },
    }))
}

/// The register each sampler pub measures into.
pub fn sampler_registers(pubs: &[SamplerPub]) -> Vec<RegisterShape> {
    pubs.iter()
        .map(|p| RegisterShape {
            name: p.circuit.creg_name().to_string(),
            num_bits: p.circuit.num_clbits(),
        })
        .collect()
}

fn float_array(data: &PubResultResponse, key: &str) -> IbmResult<Vec<f64>> {
    match data.data.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_f64()
                    .ok_or_else(|| IbmError::MalformedResult(format!("non-numeric {key}: {v}")))
            })
            .collect(),
        Some(v) => v
            .as_f64()
            .map(|x| vec![x])
            .ok_or_else(|| IbmError::MalformedResult(format!("non-numeric {key}: {v}"))),
        None => Err(IbmError::MalformedResult(format!("missing {key}"))),
    }
}

/// Read `evs`/`stds` from every pub.
pub fn decode_estimator(response: &JobResultResponse) -> IbmResult<Vec<EstimatorPubResult>> {
    response
        .results
        .iter()
        .map(|r| {
            let evs = float_array(r, "evs")?;
            let stds = float_array(r, "stds")?;
            if evs.len() != stds.len() {
                return Err(IbmError::MalformedResult(format!(
                    "{} evs but {} stds",
                    evs.len(),
                    stds.len()
                )));
            }
            Ok(EstimatorPubResult { evs, stds })
        })
        .collect()
}

/// Aggregate hex samples into counts.
///
/// With a known register shape the register is looked up by name and
/// bitstrings are padded to its width; otherwise the first register is
/// used and the width is read from `num_bits` or inferred from the
/// samples.
pub fn decode_sampler(
    response: &JobResultResponse,
    registers: Option<&[RegisterShape]>,
) -> IbmResult<Vec<SamplerPubResult>> {
    response
        .results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let shape = registers.and_then(|regs| regs.get(i));
            let (name, register) = match shape {
                Some(s) => r.data.get_key_value(&s.name),
                None => r.data.iter().min_by(|a, b| a.0.cmp(b.0)),
            }
            .ok_or_else(|| IbmError::MalformedResult(format!("pub {i} has no register data")))?;

            let samples: Vec<&str> = register
                .get("samples")
                .and_then(Value::as_array)
                .ok_or_else(|| IbmError::MalformedResult(format!("register {name} has no samples")))?
                .iter()
                .map(|s| {
                    s.as_str()
                        .ok_or_else(|| IbmError::MalformedResult(format!("bad sample {s}")))
                })
                .collect::<IbmResult<_>>()?;

            #[allow(clippy::cast_possible_truncation)]
            let width = shape.map(|s| s.num_bits).unwrap_or_else(|| {
                register
                    .get("num_bits")
                    .and_then(Value::as_u64)
                    .map_or_else(|| infer_bit_width(&samples), |n| n as usize)
            });

            let mut counts = Counts::new();
            for sample in &samples {
                counts.insert(hex_to_binary(sample, width)?, 1);
            }
            #[allow(clippy::cast_possible_truncation)]
            let shots = samples.len() as u32;
            Ok(SamplerPubResult { counts, shots })
        })
        .collect()
}

/// Bits needed for the largest sample, at least 1.
fn infer_bit_width(samples: &[&str]) -> usize {
    let max_val = samples
        .iter()
        .filter_map(|s| u128::from_str_radix(s.trim_start_matches("0x"), 16).ok())
        .max()
        .unwrap_or(0);
    if max_val == 0 {
        1
    } else {
        128 - max_val.leading_zeros() as usize
    }
}

/// `"0x3"` at width 4 is `"0011"`.
fn hex_to_binary(hex: &str, width: usize) -> IbmResult<String> {
    let digits = hex.trim_start_matches("0x");
    let value = u128::from_str_radix(digits, 16)
        .map_err(|_| IbmError::MalformedResult(format!("bad hex sample {hex}")))?;
    Ok(format!("{value:0>width$b}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrun_ir::Circuit;

    fn response(json: &str) -> JobResultResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_estimator_params_shape() {
        let pub_ = EstimatorPub::new(
            Circuit::bell().unwrap(),
            vec!["ZI".parse().unwrap(), "ZZ".parse().unwrap()],
        );
        let params = estimator_params(&[pub_], &EstimatorOptions::default()).unwrap();

        assert_eq!(params["version"], 2);
        assert_eq!(params["resilience_level"], 1);
        assert_eq!(params["options"]["default_shots"], 5000);
        let first = &params["pubs"][0];
        assert!(first[0].as_str().unwrap().starts_with("OPENQASM 3.0;"));
        assert_eq!(first[1], json!([{"ZI": 1.0}, {"ZZ": 1.0}]));
    }

    #[test]
    fn test_weighted_observable_keeps_coefficient() {
        let pub_ = EstimatorPub::new(
            Circuit::bell().unwrap(),
            vec![
                "ZZ".parse::<Observable>().unwrap().with_coeff(0.5),
                "XI".parse::<Observable>().unwrap().with_coeff(-2.0),
            ],
        );
        let params = estimator_params(&[pub_], &EstimatorOptions::default()).unwrap();
        assert_eq!(params["pubs"][0][1], json!([{"ZZ": 0.5}, {"XI": -2.0}]));
    }

    #[test]
    fn test_sampler_params_shape() {
        let mut circuit = Circuit::bell().unwrap();
        circuit.measure_all().unwrap();
        let pubs = vec![
            SamplerPub::new(circuit.clone()),
            SamplerPub::new(circuit).with_shots(10),
        ];
        let params = sampler_params(&pubs, &SamplerOptions::default()).unwrap();
        assert_eq!(params["pubs"][0][1], json!({}));
        assert_eq!(params["pubs"][0][2], 1024);
        assert_eq!(params["pubs"][1][2], 10);

        let regs = sampler_registers(&pubs);
        assert_eq!(
            regs[0],
            RegisterShape {
                name: "meas".into(),
                num_bits: 2
            }
        );
    }

    #[test]
    fn test_decode_estimator() {
        let r = response(
            r#"{"results": [{"data": {"evs": [0.98, 0.01], "stds": [0.003, 0.014]}, "metadata": {}}]}"#,
        );
        let pubs = decode_estimator(&r).unwrap();
        assert_eq!(pubs[0].evs, vec![0.98, 0.01]);
        assert_eq!(pubs[0].stds, vec![0.003, 0.014]);
    }

    #[test]
    fn test_decode_estimator_missing_field() {
        let r = response(r#"{"results": [{"data": {"evs": [1.0]}}]}"#);
        assert!(matches!(
            decode_estimator(&r),
            Err(IbmError::MalformedResult(_))
        ));
    }

    #[test]
    fn test_decode_sampler_with_known_register() {
        let r = response(
            r#"{"results": [{"data": {"meas": {"samples": ["0x0", "0x3", "0x0", "0x1"], "num_bits": 2}}}]}"#,
        );
        let shape = [RegisterShape {
            name: "meas".into(),
            num_bits: 3,
        }];
        let pubs = decode_sampler(&r, Some(&shape)).unwrap();
        assert_eq!(pubs[0].shots, 4);
        assert_eq!(pubs[0].counts.get("000"), 2);
        assert_eq!(pubs[0].counts.get("011"), 1);
        assert_eq!(pubs[0].counts.get("001"), 1);
    }

    #[test]
    fn test_decode_sampler_infers_width() {
        let r = response(r#"{"results": [{"data": {"c": {"samples": ["0x0", "0x5"]}}}]}"#);
        let pubs = decode_sampler(&r, None).unwrap();
        assert_eq!(pubs[0].counts.get("000"), 1);
        assert_eq!(pubs[0].counts.get("101"), 1);
    }

    #[test]
    fn test_hex_to_binary() {
        assert_eq!(hex_to_binary("0x0", 4).unwrap(), "0000");
        assert_eq!(hex_to_binary("0xff", 8).unwrap(), "11111111");
        assert_eq!(hex_to_binary("3", 2).unwrap(), "11");
        assert!(hex_to_binary("0xzz", 2).is_err());
    }

    #[test]
    fn test_infer_bit_width() {
        assert_eq!(infer_bit_width(&["0x0", "0x3"]), 2);
        assert_eq!(infer_bit_width(&["0x0", "0x7"]), 3);
        assert_eq!(infer_bit_width(&["0x0"]), 1);
    }
}
