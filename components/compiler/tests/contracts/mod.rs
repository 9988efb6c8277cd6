//! Contract tests for compiler

mod test_contract_compliance;
