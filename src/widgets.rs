mod diagram;

pub use diagram::ScheduleDiagram;
