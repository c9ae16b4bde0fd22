//! Per-insurer mapping strategies.
//!
//! Each known document-template family gets its own candidate-key ordering
//! and template-specific cleanup; the resolution algorithm itself is shared
//! (see [`super::resolver`]). Adding insurer support means registering a new
//! strategy here, never touching shared resolution logic.

use tracing::debug;

use super::patterns::{ENDORSEMENT_LABEL, INSTALLMENT_LABEL, POLICY_DIGITS, YEAR_RUN};
use super::resolver::FieldCandidate;
use crate::models::policy::CanonicalField;

/// Capability contract of a document-template family: ordered candidate
/// specs plus cleanup rules.
pub trait MappingStrategy: Send + Sync {
    /// Company code this strategy is registered for.
    fn company_code(&self) -> &'static str;

    /// Ordered candidates for a canonical field. Priority order encodes the
    /// template's label vocabulary; first valid candidate wins.
    fn candidates(&self, field: CanonicalField) -> Vec<FieldCandidate>;

    /// Template-specific cleanup applied to a resolved value.
    fn cleanup(&self, _field: CanonicalField, value: String) -> String {
        collapse_whitespace(&value)
    }
}

/// Select the strategy for a company identifier.
///
/// Unknown identifiers fall over to the generic strategy: extraction stays
/// best-effort even for undertrained templates.
pub fn strategy_for(company_code: &str) -> Box<dyn MappingStrategy> {
    match company_code.trim().to_uppercase().as_str() {
        "BSE" | "0001" => Box::new(BseStrategy),
        "SURA" | "0002" => Box::new(SuraStrategy),
        "MAPFRE" | "0003" => Box::new(MapfreStrategy),
        other => {
            debug!("no strategy registered for company {:?}, using generic", other);
            Box::new(GenericStrategy)
        }
    }
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Shared candidate vocabulary, used by the generic strategy and appended by
/// insurer strategies as a best-effort tail.
fn generic_candidates(field: CanonicalField) -> Vec<FieldCandidate> {
    match field {
        CanonicalField::PolicyNumber => vec![
            FieldCandidate::with_pattern("poliza.numero", &POLICY_DIGITS),
            FieldCandidate::with_pattern("nro_poliza", &POLICY_DIGITS),
            FieldCandidate::with_pattern("poliza", &POLICY_DIGITS),
            FieldCandidate::plain("numero_poliza"),
        ],
        CanonicalField::Endorsement => vec![
            FieldCandidate::plain("poliza.endoso"),
            FieldCandidate::plain("endoso"),
            FieldCandidate::with_pattern("poliza.numero", &ENDORSEMENT_LABEL),
        ],
        CanonicalField::StartDate => vec![
            FieldCandidate::plain("vigencia.desde"),
            FieldCandidate::plain("vigencia_desde"),
            FieldCandidate::plain("fecha_desde"),
            FieldCandidate::plain("inicio_vigencia"),
        ],
        CanonicalField::EndDate => vec![
            FieldCandidate::plain("vigencia.hasta"),
            FieldCandidate::plain("vigencia_hasta"),
            FieldCandidate::plain("fecha_hasta"),
            FieldCandidate::plain("fin_vigencia"),
        ],
        CanonicalField::VehicleBrand => vec![
            FieldCandidate::plain("vehiculo.marca"),
            FieldCandidate::plain("marca"),
        ],
        CanonicalField::VehicleModel => vec![
            FieldCandidate::plain("vehiculo.modelo"),
            FieldCandidate::plain("modelo"),
        ],
        CanonicalField::VehicleYear => vec![
            FieldCandidate::with_pattern("vehiculo.anio", &YEAR_RUN),
            FieldCandidate::with_pattern("anio", &YEAR_RUN),
            FieldCandidate::with_pattern("vehiculo.modelo", &YEAR_RUN),
        ],
        CanonicalField::VehiclePlate => vec![
            FieldCandidate::plain("vehiculo.matricula"),
            FieldCandidate::plain("matricula"),
            FieldCandidate::plain("patente"),
        ],
        CanonicalField::MotorNumber => vec![
            FieldCandidate::plain("vehiculo.motor"),
            FieldCandidate::plain("motor"),
        ],
        CanonicalField::ChassisNumber => vec![
            FieldCandidate::plain("vehiculo.chasis"),
            FieldCandidate::plain("chasis"),
        ],
        CanonicalField::Premium => vec![
            FieldCandidate::plain("pago.prima"),
            FieldCandidate::plain("prima"),
        ],
        CanonicalField::TotalAmount => vec![
            FieldCandidate::plain("pago.total"),
            FieldCandidate::plain("premio_total"),
            FieldCandidate::plain("total"),
        ],
        CanonicalField::InstallmentCount => vec![
            FieldCandidate::plain("pago.cuotas"),
            FieldCandidate::plain("cuotas"),
            FieldCandidate::with_pattern("pago.forma", &INSTALLMENT_LABEL),
        ],
        CanonicalField::PaymentMethod => vec![
            FieldCandidate::plain("pago.medio"),
            FieldCandidate::plain("forma_pago"),
            FieldCandidate::plain("medio_pago"),
        ],
        CanonicalField::Currency => vec![
            FieldCandidate::plain("moneda"),
            FieldCandidate::plain("conmoneda"),
            FieldCandidate::plain("pago.moneda"),
        ],
        CanonicalField::ClientName => vec![
            FieldCandidate::plain("cliente.nombre"),
            FieldCandidate::plain("asegurado"),
            FieldCandidate::plain("tomador"),
        ],
        CanonicalField::BrokerCode => vec![
            FieldCandidate::plain("corredor.codigo"),
            FieldCandidate::plain("corredor"),
        ],
        CanonicalField::Department => vec![
            FieldCandidate::plain("riesgo.departamento"),
            FieldCandidate::plain("departamento"),
            FieldCandidate::plain("localidad"),
        ],
        CanonicalField::FuelType => vec![
            FieldCandidate::plain("vehiculo.combustible"),
            FieldCandidate::plain("combustible"),
        ],
        CanonicalField::Destination => vec![
            FieldCandidate::plain("vehiculo.destino"),
            FieldCandidate::plain("destino"),
        ],
        CanonicalField::Category => vec![
            FieldCandidate::plain("vehiculo.categoria"),
            FieldCandidate::plain("categoria"),
        ],
        CanonicalField::Quality => vec![
            FieldCandidate::plain("cliente.calidad"),
            FieldCandidate::plain("calidad"),
        ],
        CanonicalField::Tariff => vec![
            FieldCandidate::plain("riesgo.tarifa"),
            FieldCandidate::plain("tarifa"),
        ],
    }
}

/// Generic/default strategy for unrecognized templates.
pub struct GenericStrategy;

impl MappingStrategy for GenericStrategy {
    fn company_code(&self) -> &'static str {
        "GENERIC"
    }

    fn candidates(&self, field: CanonicalField) -> Vec<FieldCandidate> {
        generic_candidates(field)
    }
}

/// BSE templates emit structured dotted paths; brand and model often arrive
/// combined in one "MARCA / MODELO" value.
pub struct BseStrategy;

impl MappingStrategy for BseStrategy {
    fn company_code(&self) -> &'static str {
        "BSE"
    }

    fn candidates(&self, field: CanonicalField) -> Vec<FieldCandidate> {
        let mut candidates = match field {
            CanonicalField::PolicyNumber => vec![
                FieldCandidate::with_pattern("poliza.numero", &POLICY_DIGITS),
                FieldCandidate::with_pattern("caratula", &POLICY_DIGITS),
            ],
            CanonicalField::Endorsement => vec![
                FieldCandidate::plain("poliza.endoso"),
                FieldCandidate::with_pattern("caratula", &ENDORSEMENT_LABEL),
            ],
            CanonicalField::StartDate => vec![FieldCandidate::plain("poliza.vigencia.desde")],
            CanonicalField::EndDate => vec![FieldCandidate::plain("poliza.vigencia.hasta")],
            CanonicalField::VehicleBrand => vec![FieldCandidate::plain("vehiculo.marca_modelo")],
            CanonicalField::VehicleModel => vec![FieldCandidate::plain("vehiculo.marca_modelo")],
            CanonicalField::Premium => vec![FieldCandidate::plain("pago.prima_comercial")],
            CanonicalField::TotalAmount => vec![FieldCandidate::plain("pago.premio_total")],
            CanonicalField::InstallmentCount => vec![
                FieldCandidate::plain("pago.cantidad_cuotas"),
                FieldCandidate::with_pattern("pago.plan", &INSTALLMENT_LABEL),
            ],
            CanonicalField::Currency => vec![FieldCandidate::plain("pago.moneda")],
            _ => Vec::new(),
        };
        candidates.extend(generic_candidates(field));
        candidates
    }

    fn cleanup(&self, field: CanonicalField, value: String) -> String {
        let value = collapse_whitespace(&value);
        match field {
            // "MARCA / MODELO" blob: brand before the slash, model after
            CanonicalField::VehicleBrand => value
                .split('/')
                .next()
                .unwrap_or(&value)
                .trim()
                .to_string(),
            CanonicalField::VehicleModel => value
                .split_once('/')
                .map(|(_, model)| model.trim().to_string())
                .unwrap_or(value),
            _ => value,
        }
    }
}

/// SURA templates come out of OCR as flat, label-like keys plus one
/// "datos.poliza" blob holding number and endorsement together.
pub struct SuraStrategy;

impl MappingStrategy for SuraStrategy {
    fn company_code(&self) -> &'static str {
        "SURA"
    }

    fn candidates(&self, field: CanonicalField) -> Vec<FieldCandidate> {
        let mut candidates = match field {
            CanonicalField::PolicyNumber => vec![
                FieldCandidate::with_pattern("datos.poliza", &POLICY_DIGITS),
                FieldCandidate::with_pattern("nro. de poliza", &POLICY_DIGITS),
            ],
            CanonicalField::Endorsement => vec![
                FieldCandidate::with_pattern("datos.poliza", &ENDORSEMENT_LABEL),
                FieldCandidate::plain("endoso"),
            ],
            CanonicalField::StartDate => vec![FieldCandidate::plain("vigencia desde")],
            CanonicalField::EndDate => vec![FieldCandidate::plain("vigencia hasta")],
            CanonicalField::VehicleBrand => vec![FieldCandidate::plain("marca")],
            CanonicalField::VehicleModel => vec![FieldCandidate::plain("modelo")],
            CanonicalField::VehicleYear => vec![FieldCandidate::with_pattern("año", &YEAR_RUN)],
            CanonicalField::Premium => vec![FieldCandidate::plain("prima comercial")],
            CanonicalField::TotalAmount => vec![FieldCandidate::plain("premio total")],
            CanonicalField::InstallmentCount => {
                vec![FieldCandidate::plain("cantidad de cuotas")]
            }
            CanonicalField::PaymentMethod => vec![FieldCandidate::plain("forma de pago")],
            CanonicalField::ClientName => vec![FieldCandidate::plain("asegurado")],
            CanonicalField::BrokerCode => vec![FieldCandidate::plain("corredor")],
            _ => Vec::new(),
        };
        candidates.extend(generic_candidates(field));
        candidates
    }

    fn cleanup(&self, _field: CanonicalField, value: String) -> String {
        // SURA values carry a trailing ".-" terminator
        collapse_whitespace(value.trim_end_matches(".-"))
    }
}

/// MAPFRE templates group values under "condiciones"/"bien"/"recibo"
/// sections and zero-pad policy and endorsement numbers.
pub struct MapfreStrategy;

impl MappingStrategy for MapfreStrategy {
    fn company_code(&self) -> &'static str {
        "MAPFRE"
    }

    fn candidates(&self, field: CanonicalField) -> Vec<FieldCandidate> {
        let mut candidates = match field {
            CanonicalField::PolicyNumber => vec![
                FieldCandidate::with_pattern("condiciones.poliza", &POLICY_DIGITS),
            ],
            CanonicalField::Endorsement => vec![
                FieldCandidate::with_pattern("condiciones.poliza", &ENDORSEMENT_LABEL),
                FieldCandidate::plain("condiciones.endoso"),
            ],
            CanonicalField::StartDate => {
                vec![FieldCandidate::plain("condiciones.vigencia_inicio")]
            }
            CanonicalField::EndDate => vec![FieldCandidate::plain("condiciones.vigencia_fin")],
            CanonicalField::VehicleBrand => vec![FieldCandidate::plain("bien.marca")],
            CanonicalField::VehicleModel => vec![FieldCandidate::plain("bien.modelo")],
            CanonicalField::VehicleYear => {
                vec![FieldCandidate::with_pattern("bien.anio", &YEAR_RUN)]
            }
            CanonicalField::VehiclePlate => vec![FieldCandidate::plain("bien.matricula")],
            CanonicalField::MotorNumber => vec![FieldCandidate::plain("bien.motor")],
            CanonicalField::ChassisNumber => vec![FieldCandidate::plain("bien.chasis")],
            CanonicalField::Premium => vec![FieldCandidate::plain("recibo.prima")],
            CanonicalField::TotalAmount => vec![FieldCandidate::plain("recibo.premio")],
            CanonicalField::InstallmentCount => vec![FieldCandidate::plain("recibo.cuotas")],
            CanonicalField::PaymentMethod => vec![FieldCandidate::plain("recibo.forma_pago")],
            CanonicalField::Currency => vec![FieldCandidate::plain("recibo.moneda")],
            CanonicalField::ClientName => vec![FieldCandidate::plain("asegurado.nombre")],
            CanonicalField::BrokerCode => vec![FieldCandidate::plain("productor.codigo")],
            CanonicalField::FuelType => vec![FieldCandidate::plain("bien.combustible")],
            CanonicalField::Destination => vec![FieldCandidate::plain("bien.destino")],
            CanonicalField::Category => vec![FieldCandidate::plain("bien.categoria")],
            _ => Vec::new(),
        };
        candidates.extend(generic_candidates(field));
        candidates
    }

    fn cleanup(&self, field: CanonicalField, value: String) -> String {
        let value = collapse_whitespace(&value);
        match field {
            CanonicalField::PolicyNumber | CanonicalField::Endorsement => {
                let trimmed = value.trim_start_matches('0');
                if trimmed.is_empty() {
                    "0".to_string()
                } else {
                    trimmed.to_string()
                }
            }
            _ => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::resolver::resolve;
    use crate::models::record::RawExtractionRecord;

    #[test]
    fn test_factory_known_companies() {
        assert_eq!(strategy_for("BSE").company_code(), "BSE");
        assert_eq!(strategy_for("sura").company_code(), "SURA");
        assert_eq!(strategy_for("0003").company_code(), "MAPFRE");
    }

    #[test]
    fn test_factory_unknown_falls_back_to_generic() {
        assert_eq!(strategy_for("ACME SEGUROS").company_code(), "GENERIC");
        assert_eq!(strategy_for("").company_code(), "GENERIC");
    }

    #[test]
    fn test_sura_blob_beats_generic_key() {
        let record = RawExtractionRecord::from_pairs([
            ("datos.poliza", "Póliza 7654321 Endoso: 2"),
            ("poliza.numero", "1111111"),
        ]);

        let strategy = SuraStrategy;
        let number = resolve(&record, &strategy.candidates(CanonicalField::PolicyNumber))
            .unwrap()
            .value;
        let endorsement = resolve(&record, &strategy.candidates(CanonicalField::Endorsement))
            .unwrap()
            .value;

        assert_eq!(number, "7654321");
        assert_eq!(endorsement, "2");
    }

    #[test]
    fn test_bse_brand_model_blob_split() {
        let strategy = BseStrategy;
        assert_eq!(
            strategy.cleanup(CanonicalField::VehicleBrand, "CHEVROLET / ONIX LTZ".to_string()),
            "CHEVROLET"
        );
        assert_eq!(
            strategy.cleanup(CanonicalField::VehicleModel, "CHEVROLET / ONIX LTZ".to_string()),
            "ONIX LTZ"
        );
    }

    #[test]
    fn test_mapfre_strips_leading_zeros() {
        let strategy = MapfreStrategy;
        assert_eq!(
            strategy.cleanup(CanonicalField::PolicyNumber, "0001234567".to_string()),
            "1234567"
        );
        assert_eq!(
            strategy.cleanup(CanonicalField::Endorsement, "000".to_string()),
            "0"
        );
    }

    #[test]
    fn test_sura_trailing_terminator_cleanup() {
        let strategy = SuraStrategy;
        assert_eq!(
            strategy.cleanup(CanonicalField::ClientName, "JUAN  PEREZ.-".to_string()),
            "JUAN PEREZ"
        );
    }

    #[test]
    fn test_generic_strategy_covers_every_field() {
        let strategy = GenericStrategy;
        for field in CanonicalField::ALL {
            assert!(
                !strategy.candidates(field).is_empty(),
                "no candidates for {}",
                field
            );
        }
    }
}
