pub mod attendance;
pub mod audit;
pub mod benefit;
pub mod dashboard;
pub mod employee;
pub mod holiday;
pub mod pay_component;
pub mod payroll_period;
pub mod response;
