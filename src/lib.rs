// Copyright @yucwang 2021

pub mod core;
pub mod dispatchers;
pub mod emitters;
pub mod io;
pub mod kernels;
pub mod math;
