use state_machines::state_machine;

state_machine! {
    name: TrainingMachine,
    initial: Init,
    states: [Init, Streaming, Closed],
    events {
        open { transition: { from: Init, to: Streaming } }
        close { transition: { from: Streaming, to: Closed } }
    }
}

pub fn init() -> TrainingMachine<(), Init> {
    TrainingMachine::new(())
}
