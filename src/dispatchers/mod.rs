// Copyright @yucwang 2021

pub mod dispatcher;
pub mod tiled;
