pub mod behaviour;
pub mod block;
pub mod entity;
pub mod falling;
pub mod state;
pub mod terrain;
pub mod walking;
