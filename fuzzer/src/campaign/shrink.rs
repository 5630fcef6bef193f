//!
//! The call sequence shrinker.
//!

use rand::rngs::SmallRng;
use rand::Rng;

use crate::generator::value::zero_token;
use crate::project::Project;
use crate::sequence::CallSequence;

/// The number of consecutive unproductive candidates after which shrinking
/// gives up early, before the budget is exhausted.
const MAX_CONSECUTIVE_MISSES: u64 = 200;

///
/// Minimizes a failing call sequence.
///
/// Candidates are produced by dropping call ranges, dropping single calls,
/// and zeroing arguments; a candidate replaces the witness only when
/// `still_fails` confirms it falsifies the same test. The loop spends at
/// most `limit` candidate executions.
///
pub fn shrink<F>(
    witness: CallSequence,
    limit: u64,
    rng: &mut SmallRng,
    project: &Project,
    mut still_fails: F,
) -> CallSequence
where
    F: FnMut(&CallSequence) -> bool,
{
    let mut witness = witness;
    let mut misses = 0;

    for _ in 0..limit {
        if misses >= MAX_CONSECUTIVE_MISSES {
            break;
        }

        let candidate = match candidate(&witness, rng, project) {
            Some(candidate) => candidate,
            None => break,
        };

        if still_fails(&candidate) {
            witness = candidate;
            misses = 0;
        } else {
            misses += 1;
        }
    }

    witness
}

///
/// Produces one shrinking candidate, favoring large cuts.
///
/// Returns `None` when the witness is a single argument-free call, which
/// cannot shrink further.
///
fn candidate(
    witness: &CallSequence,
    rng: &mut SmallRng,
    project: &Project,
) -> Option<CallSequence> {
    let length = witness.len();
    let can_cut = length > 1;
    let can_zero = witness
        .calls
        .iter()
        .any(|call| !call.tokens.is_empty());
    if !can_cut && !can_zero {
        return None;
    }

    match rng.gen_range(0..4_u32) {
        0 if can_cut => {
            // Drop a contiguous range, up to half of the sequence.
            let cut = rng.gen_range(1..=(length / 2).max(1));
            let start = rng.gen_range(0..=length - cut);
            let mut calls = witness.calls.clone();
            calls.drain(start..start + cut);
            Some(CallSequence::new(calls))
        }
        1 if can_cut => Some(witness.without_call(rng.gen_range(0..length))),
        2 if can_cut => Some(witness.prefix(rng.gen_range(1..length))),
        _ if can_zero => {
            let mut calls = witness.calls.clone();
            let candidates: Vec<usize> = calls
                .iter()
                .enumerate()
                .filter(|(_, call)| !call.tokens.is_empty())
                .map(|(index, _)| index)
                .collect();
            let index = candidates[rng.gen_range(0..candidates.len())];

            let handle = project.resolve_call(&calls[index])?;
            let argument = rng.gen_range(0..calls[index].tokens.len());
            calls[index].tokens[argument] =
                zero_token(&handle.function.inputs[argument].kind);
            calls[index].calldata = handle
                .function
                .encode_input(calls[index].tokens.as_slice())
                .expect("Always valid");
            Some(CallSequence::new(calls))
        }
        _ if can_cut => Some(witness.without_call(rng.gen_range(0..length))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use solc_adapter::Build;
    use solc_adapter::StandardJsonOutput;

    use crate::config::Config;
    use crate::filters::Filters;
    use crate::generator::Generator;
    use crate::project::Project;
    use crate::utils;

    use super::shrink;

    fn project() -> Project {
        let output: StandardJsonOutput = serde_json::from_value(serde_json::json!({
            "contracts": {
                "contracts/Token.sol": {
                    "Token": {
                        "abi": [
                            {
                                "inputs": [ { "name": "amount", "type": "uint256" } ],
                                "name": "burn",
                                "outputs": [],
                                "stateMutability": "nonpayable",
                                "type": "function"
                            },
                            {
                                "inputs": [ { "name": "amount", "type": "uint256" } ],
                                "name": "mint",
                                "outputs": [],
                                "stateMutability": "nonpayable",
                                "type": "function"
                            },
                            {
                                "inputs": [],
                                "name": "fuzz_supply_is_constant",
                                "outputs": [ { "name": "", "type": "bool" } ],
                                "stateMutability": "view",
                                "type": "function"
                            }
                        ],
                        "evm": { "bytecode": { "object": "6001" } }
                    }
                }
            }
        }))
        .expect("Parsing failed");
        let build = Build::try_from_standard_json(output).expect("Build failed");
        Project::try_from_build(&build, &Config::default(), &Filters::default())
            .expect("Project building failed")
    }

    #[test]
    fn shrinks_down_to_the_culprit_call() {
        let project = project();
        let mut generator = Generator::new(
            11,
            vec![utils::parse_address("0x10000").expect("Always valid")],
            40,
            0,
            0,
        );
        let witness = generator.sequence(&project);
        assert!(witness.len() > 1);

        // The "test" fails whenever a `burn` call is present.
        let mut rng = SmallRng::seed_from_u64(12);
        let shrunk = shrink(witness, 2000, &mut rng, &project, |candidate| {
            candidate.calls.iter().any(|call| call.function == "burn")
        });

        assert_eq!(shrunk.len(), 1);
        assert_eq!(shrunk.calls[0].function.as_str(), "burn");
    }

    #[test]
    fn the_witness_always_keeps_failing() {
        let project = project();
        let mut generator = Generator::new(
            13,
            vec![utils::parse_address("0x10000").expect("Always valid")],
            20,
            0,
            0,
        );
        let witness = generator.sequence(&project);

        let mut rng = SmallRng::seed_from_u64(14);
        let still_fails =
            |candidate: &crate::sequence::CallSequence| candidate.len() >= 3;
        let shrunk = shrink(witness.clone(), 500, &mut rng, &project, still_fails);
        if witness.len() >= 3 {
            assert!(shrunk.len() >= 3);
            assert!(shrunk.len() <= witness.len());
        } else {
            assert_eq!(shrunk.len(), witness.len());
        }
    }
}
