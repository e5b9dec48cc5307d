mod close;
mod encode_candidates;
mod index_rows;
mod load_relevance;
mod pad_candidates;

pub(crate) use close::close;
pub(crate) use encode_candidates::encode_candidates;
pub(crate) use index_rows::index_rows;
pub(crate) use load_relevance::load_relevance;
pub(crate) use pad_candidates::pad_candidates;

use anyhow::Result;
use state_machines::core::GuardError;

use super::state::EvalConversionMachine;

fn map_guard_error(event: &str, guard: GuardError) -> anyhow::Error {
    anyhow::anyhow!("invalid evaluation conversion transition during {event}: {guard:?}")
}

type StageResult<S> = Result<EvalConversionMachine<(), S>>;
