
pub(crate) use i2c_mock::{
    mock_thermal2, mock_thermal2_at_address, Faults, I2cOperation, MockError, MockThermal2Bus,
    INITIAL_CLOCK,
};
