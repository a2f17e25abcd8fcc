pub mod html;
pub mod publish;
