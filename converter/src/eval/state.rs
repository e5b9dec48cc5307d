use state_machines::state_machine;

state_machine! {
    name: EvalConversionMachine,
    initial: Init,
    states: [Init, RelevanceLoaded, Indexed, Padded, Encoded, Closed],
    events {
        load_relevance { transition: { from: Init, to: RelevanceLoaded } }
        index_rows { transition: { from: RelevanceLoaded, to: Indexed } }
        pad { transition: { from: Indexed, to: Padded } }
        encode { transition: { from: Padded, to: Encoded } }
        close { transition: { from: Encoded, to: Closed } }
    }
}

pub fn init() -> EvalConversionMachine<(), Init> {
    EvalConversionMachine::new(())
}
