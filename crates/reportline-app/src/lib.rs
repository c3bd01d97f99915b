// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod ids;
pub mod model;
pub mod picker;
pub mod report;
pub mod session;
pub mod us_states;
pub mod welcome;

pub use ids::*;
pub use model::*;
pub use picker::*;
pub use report::*;
pub use session::*;
pub use welcome::*;
