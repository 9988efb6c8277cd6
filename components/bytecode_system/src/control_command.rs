//! Stack and flow commands executed by the VM

use std::fmt;

/// Fixed set of control commands.
///
/// Discriminants are dense from zero in declaration order; [`ControlCommand::ALL`]
/// lists them in that order and the codec builds its token table from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlCommand {
    /// Enter expression evaluation mode
    EvalStart,
    /// Pop the evaluation stack to output
    EvalOutput,
    /// Leave expression evaluation mode
    EvalEnd,
    /// Duplicate the top of the evaluation stack
    Duplicate,
    /// Discard the top of the evaluation stack
    PopEvaluatedValue,
    /// Return from a function call
    PopFunction,
    /// Return from a tunnel
    PopTunnel,
    /// Start capturing output as a string value
    BeginString,
    /// Finish capturing output as a string value
    EndString,
    /// Do nothing
    NoOp,
    /// Push the number of choices generated so far
    ChoiceCount,
    /// Push the current turn index
    Turns,
    /// Push turns elapsed since a target was visited
    TurnsSince,
    /// Push how many times a target was visited
    ReadCount,
    /// Push a random integer in a range
    Random,
    /// Seed the random generator
    SeedRandom,
    /// Push the visit index of the current container
    VisitIndex,
    /// Push the next index of a shuffle sequence
    SequenceShuffleIndex,
    /// Fork the current flow as a thread
    StartThread,
    /// Stop the current flow, allowing choices to be presented
    Done,
    /// End the story
    End,
}

impl ControlCommand {
    /// Number of commands
    pub const COUNT: usize = 21;

    /// Every command, in discriminant order
    pub const ALL: [ControlCommand; ControlCommand::COUNT] = [
        ControlCommand::EvalStart,
        ControlCommand::EvalOutput,
        ControlCommand::EvalEnd,
        ControlCommand::Duplicate,
        ControlCommand::PopEvaluatedValue,
        ControlCommand::PopFunction,
        ControlCommand::PopTunnel,
        ControlCommand::BeginString,
        ControlCommand::EndString,
        ControlCommand::NoOp,
        ControlCommand::ChoiceCount,
        ControlCommand::Turns,
        ControlCommand::TurnsSince,
        ControlCommand::ReadCount,
        ControlCommand::Random,
        ControlCommand::SeedRandom,
        ControlCommand::VisitIndex,
        ControlCommand::SequenceShuffleIndex,
        ControlCommand::StartThread,
        ControlCommand::Done,
        ControlCommand::End,
    ];

    /// Dense index of this command
    pub fn index(self) -> usize {
        self as usize
    }
}

// A variant appended after `End` without growing ALL breaks this.
const _: () = assert!(ControlCommand::End as usize + 1 == ControlCommand::COUNT);

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
