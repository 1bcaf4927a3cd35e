pub mod aggregate;
pub mod chart;
pub mod locale;
pub mod svg;
