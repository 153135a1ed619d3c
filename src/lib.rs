// Biblioteca do quadro de visitas do back-office
// Expõe módulos para uso em testes e no binário

pub mod config;
pub mod session;
pub mod utils;
pub mod visitas;
