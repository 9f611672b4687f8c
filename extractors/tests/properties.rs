use chrono::NaiveDate;
use extractors::{write_skylog_csv, ImportDispatcher};
use shared_types::{ExtractionContext, ExtractionError, ImportedFlights, SourceFormat};

const SKYLOG_CSV: &str = "\
flightNumber;origin;destination;timeOut;timeIn;aircraftType;registration;crew;isPlanned;isSim;simMinutes;remarks;isPIC;isCoPilot;isPICUS;isDual;isInstructor;isPF;takeoffDay;takeoffNight;landingDay;landingNight;autoLand
KL1587;EHAM;ENBR;1646207700;1646216700;E190;PH-EXA;SELF|Jongepier, Shahane;false;false;0;first line
<second line;true;false;false;false;false;true;1;0;1;0;0
KL1588;ENBR;EHAM;1646218500;1646226000;E190;PH-EXA;SELF;false;false;0;;true;false;false;false;false;false;0;0;0;1;1";

const MCC_PILOT_LOG: &str = "\
mcc_DATE,FLIGHTNUMBER,AF_DEP,TIME_DEP,AF_ARR,TIME_ARR,AC_MODEL,AC_REG,PILOT1_NAME,PILOT2_NAME,TIME_PIC,PF
2022-03-02,KL 1587,EHAM,07:55,ENBR,10:25,E90,PHEXA,SELF,\"Jongepier, Shahane\",150,1
2022-03-02,KL1588,ENBR,23:50,EHAM,00:10,E90,PHEXA,SELF,,20,0";

const LOG_TEN_PRO: &str = concat!(
    "flight_flightDate\tflight_flightNumber\tflight_from\tflight_to\t",
    "flight_actualDepartureTime\tflight_actualArrivalTime\taircraftType_type\t",
    "flight_selectedCrewPIC\tflight_selectedCrewSIC\n",
    "02/03/2022\tKL 1587\tAMS\tBGO\t07:55\t10:25\tE90\tSELF\tJongepier, Shahane\n",
    "02/03/2022\tKL 1588\tBGO\tAMS\t23:50\t00:10\tE90\tSELF\t\n",
);

const KLC_ROSTER: &str = "\
KLM Cityhopper   Period: 02Mar22 - 27Mar22
Wed02
KL 1587  AMS 0755 1025 BGO  E90
KL 1588  BGO 2255 0040 +1 AMS  E90
Thu03
SIM LOFT 0800 1200";

const KLM_ICA_ROSTER: &str = "\
Name: WELLE JOOST   Rank: FO
Period: 14Feb22 - 20Mar22
17Feb  KL1199  AMS 0640 0825 BGO  73H
18Feb  KL1196  BGO 0910 1055 AMS  73H
CREW INFO
17Feb KL1199 44692 WELLE, JOOST 59852 JONGEPIER, SHAHANE
18Feb KL1196";

const KLC_BRIEFING: &str = "\
KLM Cityhopper   CREW BRIEFING
Date: 17MAR22
KL1587  17MAR  AMS 0755Z  BGO 1025Z  E190  PHEXA
KL1588  17MAR  BGO 2305Z  AMS 0050Z +1  E190  PHEXA";

const KLM_MONTHLY: &str = "\
KLM   FLIGHT TIME OVERVIEW
Period: 01-03-2022 - 31-03-2022
01  KL 0643  AMS 1002 1838 JFK  332  AEA  CP  PF  diverted
    to BOS
03  KL 0644  JFK 2310 1130 +1 AMS  332  AEA  FO
05  SIM OPC 0900 1300";

const KLC_MONTHLY: &str = "\
KLM Cityhopper   Flight Time Overview
Maand: maart 2022
02.03.22  KL1587  EHAM ENBR  07:58-10:21  PHEXA  E190
02.03.22  KL1588  ENBR EHAM  23:10-00:55  PHEXA  E190";

const FIXTURES: &[(SourceFormat, &str)] = &[
    (SourceFormat::SkylogCsv, SKYLOG_CSV),
    (SourceFormat::MccPilotLog, MCC_PILOT_LOG),
    (SourceFormat::LogTenPro, LOG_TEN_PRO),
    (SourceFormat::KlcRoster, KLC_ROSTER),
    (SourceFormat::KlmIcaRoster, KLM_ICA_ROSTER),
    (SourceFormat::KlcBriefing, KLC_BRIEFING),
    (SourceFormat::KlmMonthly, KLM_MONTHLY),
    (SourceFormat::KlcMonthly, KLC_MONTHLY),
];

fn dispatcher() -> ImportDispatcher {
    ImportDispatcher::new(ExtractionContext::new(
        NaiveDate::from_ymd_opt(2022, 3, 1).unwrap(),
    ))
}

fn lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

fn import(text: &str) -> (SourceFormat, ImportedFlights) {
    dispatcher()
        .dispatch(&lines(text))
        .unwrap()
        .expect("fixture should be recognized")
}

#[test]
fn each_fixture_is_recognized_as_its_format() {
    for (format, text) in FIXTURES {
        let (detected, imported) = import(text);
        assert_eq!(detected, *format);
        assert!(!imported.flights().is_empty(), "{format} produced no flights");
    }
}

#[test]
fn extraction_is_idempotent() {
    for (_, text) in FIXTURES {
        assert_eq!(import(text), import(text));
    }
}

#[test]
fn imported_flights_survive_json() {
    for (_, text) in FIXTURES {
        let (_, imported) = import(text);
        let json = serde_json::to_string(&imported).unwrap();
        let back: ImportedFlights = serde_json::from_str(&json).unwrap();
        assert_eq!(back, imported);
    }
}

#[test]
fn every_record_arrives_after_it_departs() {
    for (format, text) in FIXTURES {
        let (_, imported) = import(text);
        for flight in imported.flights() {
            assert!(
                flight.time_in > flight.time_out,
                "{format}: {} arrives before it departs",
                flight.flight_number
            );
        }
    }
}

#[test]
fn declared_periods_contain_every_flight() {
    for (format, text) in FIXTURES {
        let (_, imported) = import(text);
        if let Some(period) = imported.period() {
            assert!(period.start <= period.end);
            for flight in imported.flights() {
                assert!(period.contains(flight.time_out), "{format}: departs outside period");
                assert!(period.contains(flight.time_in), "{format}: arrives outside period");
            }
        }
    }
}

#[test]
fn capability_matches_format() {
    for (format, text) in FIXTURES {
        let (_, imported) = import(text);
        let planned = matches!(imported, ImportedFlights::PlannedFlights(_));
        assert_eq!(
            planned,
            matches!(
                format,
                SourceFormat::KlcRoster | SourceFormat::KlmIcaRoster | SourceFormat::KlcBriefing
            )
        );
        assert!(imported.flights().iter().all(|f| f.is_planned == planned));
    }
}

#[test]
fn written_logbook_reads_back_identically() {
    let (_, imported) = import(KLM_MONTHLY);
    let written = write_skylog_csv(imported.flights());

    let (format, reread) = import(&written.join("\n"));
    assert_eq!(format, SourceFormat::SkylogCsv);
    assert_eq!(reread.flights(), imported.flights());
}

#[test]
fn overnight_rollover_is_twenty_minutes() {
    let (_, imported) = import(MCC_PILOT_LOG);
    assert_eq!(imported.flights()[1].duration_minutes(), 20);
}

#[test]
fn crew_worked_example() {
    let (_, imported) = import(KLM_ICA_ROSTER);
    let kl1196 = imported
        .flights()
        .iter()
        .find(|f| f.flight_number == "KL1196")
        .unwrap();

    assert_eq!(kl1196.primary_name(), "SELF");
    assert_eq!(kl1196.secondary_names(), "Jongepier, Shahane");
}

#[test]
fn missing_delimiter_in_second_row_aborts() {
    let text = "\
flightNumber;origin;destination;timeOut;timeIn
KL1587;EHAM;ENBR;1000;2000
KL1588;ENBR;EHAM 3000;4000";

    let err = dispatcher().dispatch(&lines(text)).unwrap_err();
    assert!(matches!(
        err,
        ExtractionError::CorruptedData {
            line: 3,
            expected: 5,
            found: 4
        }
    ));
}

#[test]
fn unrelated_text_matches_nothing() {
    let text = "Meeting notes\n- book simulator\n- renew medical";
    assert!(dispatcher().dispatch(&lines(text)).unwrap().is_none());
}
