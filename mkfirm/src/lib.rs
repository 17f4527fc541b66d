/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! mkfirm – MILP model generator for partitioning (m,k)-firm periodic tasks
//! onto the fewest EDF processors.
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── task          – Task / Job / Instance types
//! ├── input/        – instance file parser
//! ├── config/       – YAML model configuration
//! ├── hyperperiod/  – LCM / GCD helpers, job counts
//! ├── model/        – variables, constraint families C1–C6, assembler
//! ├── solver/       – MilpSolver trait, solve driver, good_lp backend
//! └── feasibility   – post-solve demand/window check and EDF simulation
//! ```

pub mod config;
pub mod feasibility;
pub mod hyperperiod;
pub mod input;
pub mod model;
pub mod solver;
pub mod task;
