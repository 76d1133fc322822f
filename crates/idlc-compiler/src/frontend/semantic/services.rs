//! サービス定義の検証

use log::debug;

use crate::frontend::ast::{Method, Program, Service};
use crate::frontend::error::{CompilerError, Result};

use super::symbol_table::SymbolTable;

/// すべてのサービスを検証する
pub fn validate_services(program: &Program, symbols: &SymbolTable) -> Result<()> {
    for service in program.services() {
        validate_service(service, symbols)?;
        debug!("service {} has {} methods", service.name, service.methods.len());
    }
    Ok(())
}

fn validate_service(service: &Service, symbols: &SymbolTable) -> Result<()> {
    for (i, method) in service.methods.iter().enumerate() {
        if service.methods[..i].iter().any(|m| m.name == method.name) {
            return Err(CompilerError::semantic_error(format!(
                "method {} is defined multiple times in service {}",
                method.name, service.name
            )));
        }
        validate_method(method, symbols)?;
    }
    Ok(())
}

fn validate_method(method: &Method, symbols: &SymbolTable) -> Result<()> {
    for (i, arg) in method.args.iter().enumerate() {
        if method.args[..i].iter().any(|a| a.name == arg.name) {
            return Err(CompilerError::semantic_error(format!(
                "argument {} is defined multiple times in method {}",
                arg.name, method.name
            )));
        }
        symbols.check_type(&arg.ty, &format!("argument {} of method {}", arg.name, method.name))?;
    }

    for (i, ret) in method.returns.iter().enumerate() {
        if method.returns[..i].iter().any(|r| r.name == ret.name) {
            return Err(CompilerError::semantic_error(format!(
                "return value {} is defined multiple times in method {}",
                ret.name, method.name
            )));
        }
        symbols.check_type(
            &ret.ty,
            &format!("return value {} of method {}", ret.name, method.name),
        )?;
    }

    if method.returns.iter().filter(|r| r.stream).count() > 1 {
        return Err(CompilerError::semantic_error(format!(
            "method {} returns more than one stream",
            method.name
        )));
    }
    Ok(())
}
