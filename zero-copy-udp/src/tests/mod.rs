#![cfg(test)]

mod lane;
mod queue;
